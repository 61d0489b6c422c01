//! `puppet-provision render-config`: print the agent configuration.

use anyhow::Result;
use chrono::Utc;

use crate::app::AppContext;
use crate::domain::render::{RenderInput, render_agent_config};
use crate::domain::{NodeIdentity, ProvisioningConfig};

/// Run `puppet-provision render-config`.
///
/// The rendered file goes to stdout unstyled so it can be piped.
///
/// # Errors
///
/// Returns a parameter error if the declared parameters are invalid.
pub fn run(app: &AppContext) -> Result<()> {
    let config = ProvisioningConfig::from_context(&app.host)?;
    let identity = NodeIdentity::derive(&config, &app.host.node.node_id, Utc::now());
    let local_modules = app.layout.local_modules();
    let conf = render_agent_config(&RenderInput {
        environment: &config.environment,
        server: &config.server,
        identity: &identity,
        local_modules: &local_modules.to_string_lossy(),
    });
    print!("{conf}");
    Ok(())
}
