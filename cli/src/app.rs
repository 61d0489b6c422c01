//! Application context: unified state passed to every command handler.
//!
//! `AppContext` is built once from the top-level CLI flags and owns the
//! production adapters for every port.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::services::run::DEFAULT_AGENT_DEADLINE;
use crate::domain::{AgentLayout, HostContext};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::context::load_context;
use crate::infra::host::EtcHostInspector;
use crate::infra::repo::UreqRepoClient;
use crate::infra::scratch::TempScratch;
use crate::infra::sudo::SudoExecutor;
use crate::output::OutputContext;

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Host context document.
    pub context: PathBuf,
    /// Elevation program.
    pub sudo: String,
    /// Timeout for each privileged command.
    pub command_timeout: Duration,
    /// Timeout for each repository request.
    pub http_timeout: Duration,
    /// Agent run deadline; overrides the context's.
    pub agent_deadline: Option<Duration>,
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Orchestration host context for this invocation.
    pub host: HostContext,
    /// Privileged executor for every OS mutation.
    pub sudo: SudoExecutor<TokioCommandRunner>,
    pub repo: UreqRepoClient,
    pub inspector: EtcHostInspector,
    pub scratch: TempScratch,
    pub layout: AgentLayout,
    agent_deadline: Option<Duration>,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the host context cannot be loaded or the home
    /// directory cannot be determined.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let host = load_context(&flags.context)?;
        let home = dirs::home_dir().context("cannot determine home directory")?;

        Ok(Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            host,
            sudo: SudoExecutor::new(
                TokioCommandRunner::new(flags.command_timeout),
                flags.sudo.clone(),
                flags.command_timeout,
            ),
            repo: UreqRepoClient::new(flags.http_timeout),
            inspector: EtcHostInspector::system(),
            scratch: TempScratch::default(),
            layout: AgentLayout::new(&home),
            agent_deadline: flags.agent_deadline,
        })
    }

    /// Deadline for the agent run: CLI flag, then host context, then default.
    #[must_use]
    pub fn agent_deadline(&self) -> Duration {
        self.agent_deadline
            .or_else(|| self.host.deadline_secs.map(Duration::from_secs))
            .unwrap_or(DEFAULT_AGENT_DEADLINE)
    }
}
