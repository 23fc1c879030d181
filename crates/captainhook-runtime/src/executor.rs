use std::io;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::ScriptError;
use crate::input::Input;
use crate::runbook::{Script, ScriptResult};

/// Runs a single script with the request input on its stdin.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn exec(&self, script: &Script, input: &Input) -> Result<ScriptResult, ScriptError>;
}

/// Executes scripts as child processes. No shell is involved; `args` are
/// passed to the command as-is.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    timeout: Option<Duration>,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill scripts that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn exec(&self, script: &Script, input: &Input) -> Result<ScriptResult, ScriptError> {
        debug!(script = %script.command, args = ?script.args, "Spawning script");

        let mut child = Command::new(&script.command)
            .args(&script.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ScriptError::Spawn {
                command: script.command.clone(),
                source,
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| ScriptError::StdinUnavailable {
            command: script.command.clone(),
        })?;

        // Feed stdin concurrently so a child that writes before it reads
        // cannot fill its stdout pipe and stall us. Dropping the handle
        // closes the stream.
        let payload = input.as_bytes().to_vec();
        let command = script.command.clone();
        let writer = tokio::spawn(async move {
            if let Err(e) = stdin.write_all(&payload).await {
                if e.kind() == io::ErrorKind::BrokenPipe {
                    debug!(script = %command, "Script closed stdin before reading all input");
                } else {
                    warn!(script = %command, error = %e, "Failed writing script stdin");
                }
            }
        });

        let wait = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(res) => res,
                Err(_) => {
                    writer.abort();
                    return Err(ScriptError::TimedOut {
                        command: script.command.clone(),
                        timeout: limit,
                    });
                }
            },
            None => wait.await,
        }
        .map_err(|source| ScriptError::Wait {
            command: script.command.clone(),
            source,
        })?;

        let _ = writer.await;

        Ok(ScriptResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            // None means killed by a signal
            status_code: output.status.code().unwrap_or(-1),
        })
    }
}
