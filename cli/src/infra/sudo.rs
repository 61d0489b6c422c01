//! Infrastructure implementation of the `PrivilegedExecutor` port.
//!
//! `SudoExecutor<R>` prefixes every command with the elevation program and
//! routes it through a `CommandRunner`. Generic over `R` so tests can inject
//! a recording runner without spawning real processes.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::application::ports::{CommandRunner, PrivilegedExecutor, PrivilegedOutput};
use crate::domain::error::ProvisionError;

/// Default elevation program.
pub const DEFAULT_SUDO: &str = "/usr/bin/sudo";

/// Runs commands under `sudo` and captures their output.
pub struct SudoExecutor<R: CommandRunner> {
    runner: R,
    sudo: String,
    timeout: Duration,
    scratch_dir: Option<PathBuf>,
}

impl<R: CommandRunner> SudoExecutor<R> {
    /// Create an executor elevating through `sudo`.
    pub fn new(runner: R, sudo: impl Into<String>, timeout: Duration) -> Self {
        Self {
            runner,
            sudo: sudo.into(),
            timeout,
            scratch_dir: None,
        }
    }

    /// Stage `write_file` scratch files in `dir` instead of the system temp
    /// directory.
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    fn scratch_file(&self) -> Result<tempfile::NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("puppet-provision.");
        match &self.scratch_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .context("creating scratch file")
    }
}

impl<R: CommandRunner> PrivilegedExecutor for SudoExecutor<R> {
    async fn run(&self, program: &str, args: &[&str]) -> Result<PrivilegedOutput> {
        self.run_with_deadline(program, args, self.timeout).await
    }

    async fn run_with_deadline(
        &self,
        program: &str,
        args: &[&str],
        deadline: Duration,
    ) -> Result<PrivilegedOutput> {
        let mut full = vec![program];
        full.extend_from_slice(args);
        let cmdline = format!("{} {}", self.sudo, full.join(" "));
        info!("Running: '{cmdline}'");

        let output = self
            .runner
            .run_with_timeout(&self.sudo, &full, deadline)
            .await
            .with_context(|| format!("running '{cmdline}'"))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        log_text("stdout", "  [out] ", &stdout);
        log_text("stderr", "  [err] ", &stderr);

        if !output.status.success() {
            return Err(ProvisionError::Elevation {
                command: cmdline,
                status: status_text(output.status),
                stdout,
                stderr,
            }
            .into());
        }
        Ok(PrivilegedOutput { stdout, stderr })
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let mut file = self.scratch_file()?;
        file.write_all(contents)
            .and_then(|()| file.flush())
            .with_context(|| format!("staging contents for {}", path.display()))?;
        // Removes the scratch file on every path; after a successful `mv`
        // there is nothing left to remove.
        let staged = file.into_temp_path();
        let src = staged.to_string_lossy().into_owned();
        let dest = path.to_string_lossy().into_owned();
        self.run("mv", &[src.as_str(), dest.as_str()]).await?;
        Ok(())
    }
}

/// Log captured text one line at a time under a header.
fn log_text(title: &str, prefix: &str, text: &str) {
    if text.is_empty() {
        return;
    }
    info!("*** {title} ***");
    for line in text.lines() {
        info!("{prefix}{line}");
    }
}

fn status_text(status: ExitStatus) -> String {
    status
        .code()
        .map_or_else(|| status.to_string(), |code| code.to_string())
}
