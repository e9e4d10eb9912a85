//! apitest - declarative black-box test runner for HTTP API servers
//!
//! Spawns the server under test, derives concrete test cases from a layered
//! YAML document (section defaults + per-case overrides, with explicit null
//! deleting an inherited default), replays them as HTTP requests, and
//! reports pass/fail results with CI-friendly exit codes.

pub mod cli;
pub mod common;
pub mod runner;
pub mod suite;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use suite::{ResolvedTestCase, Section};
