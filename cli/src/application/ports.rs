//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use anyhow::Result;
use tempfile::TempPath;

use crate::domain::OsRelease;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Captured output of one successful privileged command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivilegedOutput {
    pub stdout: String,
    pub stderr: String,
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Privileged Execution Port ─────────────────────────────────────────────────

/// Runs OS-mutating commands with elevated rights.
///
/// Every mutation of the host goes through this port; nothing else spawns
/// processes with privileges.
#[allow(async_fn_in_trait)]
pub trait PrivilegedExecutor {
    /// Run `program args...` elevated, with the executor's default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError::Elevation` if the command exits non-zero.
    async fn run(&self, program: &str, args: &[&str]) -> Result<PrivilegedOutput>;
    /// Same as `run`, bounded by `deadline` instead of the default timeout.
    async fn run_with_deadline(
        &self,
        program: &str,
        args: &[&str],
        deadline: Duration,
    ) -> Result<PrivilegedOutput>;
    /// Place `contents` at `path` without opening `path` with privileges:
    /// write a private scratch file, then move it into place elevated.
    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()>;
}

// ── Repository Port ───────────────────────────────────────────────────────────

/// HTTP access to the remote package repository.
#[allow(async_fn_in_trait)]
pub trait RepoClient {
    /// Check that `url` exists (HEAD-equivalent).
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError::Network` unless the server answers 200.
    async fn probe(&self, url: &str) -> Result<()>;
    /// Download `url` into a scoped temporary file, removed when the
    /// returned guard is dropped.
    async fn download(&self, url: &str) -> Result<TempPath>;
}

// ── Host Inspection Port ──────────────────────────────────────────────────────

/// Reads what the host reports about its operating system.
pub trait HostInspector {
    /// Distribution id and release information.
    fn os_release(&self) -> Result<OsRelease>;
}

// ── Scratch Files Port ────────────────────────────────────────────────────────

/// Unprivileged, uniquely named temporary files.
pub trait ScratchSpace {
    /// Create a file named `<prefix><random><suffix>` holding `contents`.
    /// The file is removed when the returned guard is dropped unless the
    /// caller keeps it.
    fn create(&self, prefix: &str, suffix: &str, contents: &[u8]) -> Result<TempPath>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
