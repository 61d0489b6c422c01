//! Application service: agent installation use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.
//!
//! Steps are not guarded by existence checks. Re-running on a provisioned
//! node repeats every step; installers and `mkdir -p` tolerate that.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::application::ports::{PrivilegedExecutor, ProgressReporter, RepoClient};
use crate::application::services::platform::PlatformStrategy;
use crate::domain::ProvisioningConfig;
use crate::domain::identity::NodeIdentity;
use crate::domain::layout::{AgentLayout, CUSTOM_FACTS_SCRIPT, WORK_DIR_MODE};
use crate::domain::render::{RenderInput, render_agent_config};

/// Name of the agent package.
pub const AGENT_PACKAGE: &str = "puppet";

/// Inputs to `install`.
pub struct InstallRequest<'a> {
    pub config: &'a ProvisioningConfig,
    /// Orchestrator-assigned node id, the core of the node name.
    pub node_id: &'a str,
    pub layout: &'a AgentLayout,
    /// Clock reading used for the certificate name.
    pub now: DateTime<Utc>,
}

/// What `install` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub strategy: &'static str,
    pub repo_url: String,
    pub agent_version: Option<String>,
    pub identity: NodeIdentity,
    pub config_path: PathBuf,
}

/// Install and configure the Puppet agent.
///
/// Aborts on the first failing step; nothing already done is undone.
///
/// # Errors
///
/// Returns a network error if the repository package is unreachable, an
/// elevation error if any privileged command fails, or an
/// `UnsupportedRelease` error if the host release cannot be determined.
pub async fn install(
    strategy: &impl PlatformStrategy,
    sudo: &impl PrivilegedExecutor,
    repo: &impl RepoClient,
    reporter: &impl ProgressReporter,
    req: &InstallRequest<'_>,
) -> Result<InstallReport> {
    let config = req.config;

    // Step 1: Locate and probe the repository package.
    let url = strategy.repo_package_url(&config.repos)?;
    reporter.step(&format!("checking repository package at {url}..."));
    repo.probe(&url).await?;

    // Step 2: Install it.
    info!(%url, strategy = strategy.name(), "installing repository package");
    reporter.step("installing repository package...");
    strategy.install_package_from_url(sudo, repo, &url).await?;

    // Step 3: Refresh package metadata.
    reporter.step("refreshing package cache...");
    strategy.refresh_package_cache(sudo).await?;

    // Step 4: Agent package, then platform extras.
    let version = config
        .version
        .as_deref()
        .or_else(|| strategy.default_agent_version());
    if version.is_none() {
        reporter.warn(&format!(
            "no {AGENT_PACKAGE} version pinned, installing the repository's latest"
        ));
    }
    reporter.step(&format!(
        "installing {AGENT_PACKAGE} {}...",
        version.unwrap_or("(latest)")
    ));
    strategy.install_package(sudo, AGENT_PACKAGE, version).await?;
    for package in strategy.extra_packages() {
        reporter.step(&format!("installing {package}..."));
        strategy.install_package(sudo, package, None).await?;
    }

    // Step 5: Working directories, owner-only.
    reporter.step("creating working directories...");
    let dirs: Vec<String> = req
        .layout
        .work_dirs()
        .iter()
        .map(|d| d.to_string_lossy().into_owned())
        .collect();
    let dir_refs: Vec<&str> = dirs.iter().map(String::as_str).collect();
    let mut mkdir = vec!["-p"];
    mkdir.extend_from_slice(&dir_refs);
    sudo.run("mkdir", &mkdir)
        .await
        .context("creating working directories")?;
    let mut chmod = vec![WORK_DIR_MODE];
    chmod.extend_from_slice(&dir_refs);
    sudo.run("chmod", &chmod)
        .await
        .context("restricting working directories")?;

    // Step 6: Custom facts script.
    install_custom_facts(sudo, reporter, req.layout).await?;

    // Step 7: Agent configuration.
    let identity = configure(sudo, reporter, req).await?;

    reporter.success("Puppet agent installed");
    Ok(InstallReport {
        strategy: strategy.name(),
        repo_url: url,
        agent_version: version.map(str::to_string),
        identity,
        config_path: req.layout.config_path.clone(),
    })
}

/// Place the bundled custom-facts script into the facts directory.
///
/// # Errors
///
/// Returns an elevation error if the privileged write fails.
pub async fn install_custom_facts(
    sudo: &impl PrivilegedExecutor,
    reporter: &impl ProgressReporter,
    layout: &AgentLayout,
) -> Result<()> {
    let dest = layout.custom_facts_script();
    info!(dest = %dest.display(), "installing custom facts");
    reporter.step("installing custom facts...");
    sudo.write_file(&dest, CUSTOM_FACTS_SCRIPT.as_bytes())
        .await
        .context("installing custom facts")
}

/// Render the agent configuration and write it into place.
///
/// # Errors
///
/// Returns an elevation error if the privileged write fails.
pub async fn configure(
    sudo: &impl PrivilegedExecutor,
    reporter: &impl ProgressReporter,
    req: &InstallRequest<'_>,
) -> Result<NodeIdentity> {
    let identity = NodeIdentity::derive(req.config, req.node_id, req.now);
    let local_modules = req.layout.local_modules();
    let conf = render_agent_config(&RenderInput {
        environment: &req.config.environment,
        server: &req.config.server,
        identity: &identity,
        local_modules: &local_modules.to_string_lossy(),
    });

    reporter.step(&format!(
        "writing {} (certname {})...",
        req.layout.config_path.display(),
        identity.certname
    ));
    sudo.write_file(&req.layout.config_path, conf.as_bytes())
        .await
        .context("writing agent configuration")?;
    Ok(identity)
}
