//! External hand detector process.
//!
//! The detector owns the camera and the preview window. It prints one JSON
//! frame per line on stdout and reads overlay messages on stdin.

use anyhow::{Context, Result};
use log::{info, warn};
use std::ffi::OsStr;
use std::io::BufReader;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

pub struct DetectorProcess {
    process: Child,
}

impl DetectorProcess {
    /// Start `program` with `args`. The child's stderr is inherited so its
    /// diagnostics stay visible.
    pub fn spawn<S: AsRef<OsStr>>(program: &OsStr, args: &[S]) -> Result<Self> {
        info!("starting detector {}", program.to_string_lossy());
        let process = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to start detector {}", program.to_string_lossy()))?;
        Ok(Self { process })
    }

    /// Take the frame stream and the overlay sink. Can only be done once.
    pub fn pipes(&mut self) -> Result<(BufReader<ChildStdout>, ChildStdin)> {
        let stdout = self.process.stdout.take().context("detector stdout already taken")?;
        let stdin = self.process.stdin.take().context("detector stdin already taken")?;
        Ok((BufReader::new(stdout), stdin))
    }
}

impl Drop for DetectorProcess {
    fn drop(&mut self) {
        match self.process.try_wait() {
            Ok(Some(status)) => info!("detector exited with {status}"),
            _ => {
                if let Err(e) = self.process.kill() {
                    warn!("failed to stop detector: {e}");
                }
                let _ = self.process.wait();
            }
        }
    }
}
