//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` spawns through tokio, captures both streams and
//! kills the child once its deadline passes.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

use crate::application::ports::CommandRunner;

/// Default timeout for privileged commands (package installs can be slow).
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(1800);

/// Production `CommandRunner`: spawns with piped stdout/stderr and kills
/// the child when the timeout fires or the future is dropped.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        debug!(program, ?args, timeout_secs = timeout.as_secs(), "spawning");
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let finished = tokio::time::timeout(timeout, async {
            tokio::join!(child.wait(), drain(stdout), drain(stderr))
        })
        .await;

        match finished {
            Ok((status, stdout, stderr)) => Ok(Output {
                status: status.with_context(|| format!("waiting for {program}"))?,
                stdout,
                stderr,
            }),
            Err(_) => {
                warn!(program, "deadline reached, killing process");
                let _ = child.kill().await;
                anyhow::bail!("{program} timed out after {}s", timeout.as_secs())
            }
        }
    }
}

/// Read a child stream to EOF. A read error keeps what arrived before it.
async fn drain(stream: Option<impl AsyncRead + Unpin>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        if let Err(e) = stream.read_to_end(&mut buf).await {
            warn!(error = %e, captured = buf.len(), "output capture cut short");
        }
    }
    buf
}
