//! `puppet-provision run`: trigger one Puppet agent run.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::run::{RunReport, RunRequest, run_agent};
use crate::domain::ProvisioningConfig;
use crate::output::TerminalReporter;

/// Run the agent with an already validated config.
///
/// # Errors
///
/// Returns an error if the facts are invalid or the agent run fails.
pub async fn execute(app: &AppContext, config: &ProvisioningConfig) -> Result<RunReport> {
    let reporter = TerminalReporter::new(&app.output);
    let req = RunRequest {
        ctx: &app.host,
        config,
        layout: &app.layout,
        deadline: app.agent_deadline(),
    };
    run_agent(&app.sudo, &app.scratch, &reporter, &req).await
}

/// Run `puppet-provision run`.
///
/// # Errors
///
/// Returns an error if validation fails or the agent run fails.
pub async fn run(app: &AppContext) -> Result<()> {
    let config = ProvisioningConfig::from_context(&app.host)?;
    let report = execute(app, &config).await?;
    app.output
        .kv("run script", &report.script_path.to_string_lossy());
    Ok(())
}
