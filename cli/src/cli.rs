//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;
use crate::infra::command_runner::DEFAULT_CMD_TIMEOUT;
use crate::infra::repo::DEFAULT_HTTP_TIMEOUT;
use crate::infra::sudo::DEFAULT_SUDO;

/// Provision this node for a Puppet agent run
#[derive(Parser)]
#[command(
    name = "puppet-provision",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Orchestration host context (JSON, or YAML by extension)
    #[arg(long, global = true, env = "PUPPET_PROVISION_CONTEXT", default_value = "context.json")]
    pub context: PathBuf,

    /// Privilege elevation program
    #[arg(long, global = true, env = "PUPPET_PROVISION_SUDO", default_value = DEFAULT_SUDO)]
    pub sudo: String,

    /// Timeout for each privileged command, in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_CMD_TIMEOUT.as_secs())]
    pub command_timeout_secs: u64,

    /// Timeout for each repository request, in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_HTTP_TIMEOUT.as_secs())]
    pub http_timeout_secs: u64,

    /// Deadline for the agent run, in seconds (overrides the host context)
    #[arg(long, global = true)]
    pub agent_deadline_secs: Option<u64>,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check puppet_config without touching the host
    Validate,

    /// Print the agent configuration install would write
    RenderConfig,

    /// Install and configure the Puppet agent
    Install,

    /// Trigger one Puppet agent run
    Run,

    /// Install, then run the agent once
    Provision,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the host context cannot be loaded or the command
    /// fails.
    pub async fn run(self) -> Result<()> {
        let flags = AppFlags {
            context: self.context,
            sudo: self.sudo,
            command_timeout: Duration::from_secs(self.command_timeout_secs),
            http_timeout: Duration::from_secs(self.http_timeout_secs),
            agent_deadline: self.agent_deadline_secs.map(Duration::from_secs),
            no_color: self.no_color,
            quiet: self.quiet,
        };
        let app = AppContext::new(&flags)?;
        match self.command {
            Command::Validate => commands::validate::run(&app),
            Command::RenderConfig => commands::render_config::run(&app),
            Command::Install => commands::install::run(&app).await,
            Command::Run => commands::run::run(&app).await,
            Command::Provision => commands::provision::run(&app).await,
        }
    }
}
