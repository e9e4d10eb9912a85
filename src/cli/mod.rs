//! Run coordination
//!
//! Owns the top-level flow: start the server, derive the cases, execute
//! them, and shut the server down again.

pub mod spawn;

use std::path::PathBuf;
use std::time::Duration;

use crate::common::Result;
use crate::runner::{self, report, CaseReport};
use crate::suite;

/// Default endpoint of the server under test
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Grace period between spawning the server and the first request
const STARTUP_DELAY: Duration = Duration::from_millis(500);

/// Everything the coordinator needs for one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub bin: PathBuf,
    pub test_path: PathBuf,
    pub base_url: String,
    pub database: Option<String>,
    pub verbose: bool,
}

/// Aggregated outcome of a completed run
#[derive(Debug)]
pub struct RunSummary {
    pub passed: Vec<CaseReport>,
    pub failed: Vec<CaseReport>,
}

impl RunSummary {
    pub fn all_passed(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Execute a full test run against a freshly spawned server.
///
/// Returns `Ok` whether or not cases failed. `Err` means the run itself
/// broke (config, spawn, transport) before the graceful terminate; the
/// caller is expected to fall back to [`spawn::kill_by_name`].
pub async fn run(options: &RunOptions) -> Result<RunSummary> {
    let server = spawn::ServerProcess::spawn(
        &options.bin,
        options.database.as_deref(),
        options.verbose,
    )?;
    tokio::time::sleep(STARTUP_DELAY).await;

    report::note(&format!(
        "reading tests from {}... ",
        options.test_path.display()
    ));
    let sections = suite::load(&options.test_path)?;
    let found: usize = sections.iter().map(|section| section.cases.len()).sum();
    report::note(&format!("found {} test(s)\n", found));

    let (passed, failed) = runner::execute(&sections, &options.base_url).await?;

    server.terminate().await?;
    Ok(RunSummary { passed, failed })
}
