//! Test execution and reporting

pub mod executor;
pub mod report;

pub use executor::{execute, CaseReport, JsonMismatch, StatusMismatch, TestResult};
