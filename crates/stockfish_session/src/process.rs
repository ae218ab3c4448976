//! Child process plumbing
//!
//! Spawns the engine with piped stdin/stdout and moves whole lines across
//! the pipes. Knows nothing about what the lines mean beyond
//! [`EngineLine::parse`].

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::protocol::{EngineLine, GuiCommand};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, trace, warn};

/// A running engine process
pub struct UciProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl UciProcess {
    /// Start the engine binary named in `config`
    pub fn spawn(config: &EngineConfig) -> EngineResult<Self> {
        let mut child = Command::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::unavailable(format!(
                    "failed to start {}: {e}",
                    config.path.display()
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::unavailable("engine stdin was not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::unavailable("engine stdout was not captured"))?;

        debug!(pid = child.id(), path = %config.path.display(), "Engine process spawned");

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        })
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Write one command line
    pub async fn send(&mut self, command: &GuiCommand) -> EngineResult<()> {
        let line = format!("{command}\n");
        trace!(">> {}", line.trim_end());

        let written = async {
            self.stdin.write_all(line.as_bytes()).await?;
            self.stdin.flush().await
        }
        .await;

        written.map_err(|e| EngineError::unavailable(format!("write to engine failed: {e}")))
    }

    /// Read the next line, failing if the engine closed its output
    pub async fn read_line(&mut self) -> EngineResult<EngineLine> {
        match self.stdout.next_line().await? {
            Some(line) => {
                trace!("<< {line}");
                EngineLine::parse(&line)
            }
            None => Err(EngineError::unavailable("engine process closed its output")),
        }
    }

    /// Read lines until `accept` returns `Some`
    pub async fn read_until<T>(
        &mut self,
        mut accept: impl FnMut(EngineLine) -> Option<T>,
    ) -> EngineResult<T> {
        loop {
            let line = self.read_line().await?;
            if let Some(value) = accept(line) {
                return Ok(value);
            }
        }
    }

    /// Whether the child has already exited
    pub fn has_exited(&mut self) -> bool {
        !matches!(self.child.try_wait(), Ok(None))
    }

    /// Ask the engine to quit, killing it if it ignores the request
    pub async fn shutdown(mut self, grace: Duration) {
        // A dead pipe here just means the engine is already gone
        let _ = self.send(&GuiCommand::Quit).await;

        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => debug!(%status, "Engine process exited"),
            Ok(Err(e)) => warn!("Waiting for engine exit failed: {e}"),
            Err(_) => {
                warn!("Engine ignored quit, killing it");
                if let Err(e) = self.child.kill().await {
                    warn!("Failed to kill engine process: {e}");
                }
            }
        }
    }
}
