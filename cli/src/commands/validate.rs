//! `puppet-provision validate`: check parameters without touching the host.

use anyhow::Result;

use crate::app::AppContext;
use crate::domain::ProvisioningConfig;
use crate::domain::facts::{check_user_facts, run_tags};

/// Run `puppet-provision validate`.
///
/// # Errors
///
/// Returns a parameter or facts-collision error if the declared
/// parameters are invalid.
pub fn run(app: &AppContext) -> Result<()> {
    let config = ProvisioningConfig::from_context(&app.host)?;
    check_user_facts(&config.facts)?;

    let out = &app.output;
    out.success("puppet_config is valid");
    out.kv("environment", &config.environment);
    out.kv("server", &config.server);
    let tags = run_tags(&config, &app.host.operation);
    if !tags.is_empty() {
        out.kv("tags", &tags.join(","));
    }
    if let Some(version) = &config.version {
        out.kv("version", version);
    }
    Ok(())
}
