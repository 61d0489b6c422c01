//! `puppet-provision install`: install and configure the Puppet agent.

use anyhow::Result;
use chrono::Utc;

use crate::app::AppContext;
use crate::application::ports::HostInspector;
use crate::application::services::install::{InstallReport, InstallRequest, install};
use crate::application::services::platform;
use crate::domain::ProvisioningConfig;
use crate::output::TerminalReporter;

/// Resolve the platform and install with an already validated config.
///
/// # Errors
///
/// Returns an error if platform resolution or any install step fails.
pub async fn execute(app: &AppContext, config: &ProvisioningConfig) -> Result<InstallReport> {
    let os = app.inspector.os_release()?;
    let strategy = platform::resolve(&os)?;
    tracing::info!(distro = %os.id, strategy = ?strategy, "platform resolved");

    let reporter = TerminalReporter::new(&app.output);
    let req = InstallRequest {
        config,
        node_id: &app.host.node.node_id,
        layout: &app.layout,
        now: Utc::now(),
    };
    install(&strategy, &app.sudo, &app.repo, &reporter, &req).await
}

/// Run `puppet-provision install`.
///
/// # Errors
///
/// Returns an error if validation, platform resolution or any install
/// step fails.
pub async fn run(app: &AppContext) -> Result<()> {
    let config = ProvisioningConfig::from_context(&app.host)?;
    let report = execute(app, &config).await?;
    print_report(app, &report);
    Ok(())
}

pub(crate) fn print_report(app: &AppContext, report: &InstallReport) {
    let out = &app.output;
    out.kv("strategy", report.strategy);
    out.kv("repository", &report.repo_url);
    if let Some(version) = &report.agent_version {
        out.kv("version", version);
    }
    out.kv("certname", &report.identity.certname);
    out.kv("config", &report.config_path.to_string_lossy());
}
