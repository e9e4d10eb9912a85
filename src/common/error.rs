//! Error types for the test runner
//!
//! Only run-level errors live here. Expected-vs-actual mismatches on a single
//! case are not errors: they are recorded in the case result and the run
//! continues.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the test runner
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse test document: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Server Process Errors ===
    #[error("Failed to start server '{path}': {error}")]
    ServerSpawn { path: String, error: String },

    // === HTTP Errors ===
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
