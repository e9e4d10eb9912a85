//! Server subprocess lifecycle
//!
//! Spawns the server under test with its stdio sunk unless verbose mode is
//! on, terminates it gracefully after a run, and falls back to killing by
//! process name when a run aborts before the graceful path was reached.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};

use crate::common::{Error, Result};

/// How long to wait for the server to exit after a graceful signal
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the spawned server under test
pub struct ServerProcess {
    child: Child,
}

impl ServerProcess {
    /// Spawn the server binary.
    ///
    /// The child's stdout/stderr go to a null sink unless `verbose`;
    /// `database` is exported as `DATABASE_NAME` when given.
    pub fn spawn(bin: &Path, database: Option<&str>, verbose: bool) -> Result<Self> {
        let mut command = Command::new(bin);
        command.stdin(Stdio::null());
        if verbose {
            command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }
        if let Some(database) = database {
            command.env("DATABASE_NAME", database);
        }

        let child = command.spawn().map_err(|e| Error::ServerSpawn {
            path: bin.display().to_string(),
            error: e.to_string(),
        })?;
        tracing::debug!(server = %bin.display(), pid = child.id(), "server spawned");
        Ok(Self { child })
    }

    /// Terminate the server, preferring a graceful signal.
    pub async fn terminate(mut self) -> Result<()> {
        #[cfg(unix)]
        if let Some(pid) = self.child.id() {
            // SIGTERM first so the server can flush and shut down cleanly
            unsafe {
                libc::kill(pid as i32, libc::SIGTERM);
            }
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.child.wait()).await {
                Ok(status) => {
                    status?;
                    return Ok(());
                }
                Err(_) => {
                    tracing::warn!("server ignored SIGTERM, killing");
                }
            }
        }

        self.child.kill().await?;
        Ok(())
    }
}

/// Best-effort fallback: kill every process with the binary's file name.
///
/// Used when a run aborts before the graceful terminate was reached, so the
/// server does not outlive the tool.
pub async fn kill_by_name(bin: &Path) {
    let Some(name) = bin.file_name().and_then(|name| name.to_str()) else {
        return;
    };
    let killed = Command::new("killall")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    if let Err(error) = killed {
        tracing::warn!(%error, "killall fallback failed");
    }
}
