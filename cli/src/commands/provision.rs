//! `puppet-provision provision`: install, then run the agent once.

use anyhow::Result;

use crate::app::AppContext;
use crate::commands::{install, run};
use crate::domain::ProvisioningConfig;
use crate::domain::facts::check_user_facts;

/// Run `puppet-provision provision`.
///
/// Facts are checked up front so a collision fails before any install
/// step mutates the host.
///
/// # Errors
///
/// Returns the first error from validation, install or the agent run.
pub async fn run(app: &AppContext) -> Result<()> {
    let config = ProvisioningConfig::from_context(&app.host)?;
    check_user_facts(&config.facts)?;

    app.output.header("Installing Puppet agent");
    let installed = install::execute(app, &config).await?;
    install::print_report(app, &installed);

    app.output.header("Running Puppet agent");
    let report = run::execute(app, &config).await?;
    app.output
        .kv("run script", &report.script_path.to_string_lossy());
    app.output.success("node provisioned");
    Ok(())
}
