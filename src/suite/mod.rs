//! Test document loading and case resolution
//!
//! Turns the layered defaults/override YAML document into flat,
//! fully-resolved test cases grouped by section.

mod config;
mod resolve;

pub use config::{Expected, Method, RawSection, ResolvedTestCase, Section, SECTION_ORDER};
pub use resolve::{load, resolve};
