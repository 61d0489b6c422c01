//! Application service: single Puppet agent run.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::application::ports::{PrivilegedExecutor, ProgressReporter, ScratchSpace};
use crate::domain::facts::{agent_command, build_facts, run_script, run_tags};
use crate::domain::layout::AgentLayout;
use crate::domain::{HostContext, ProvisioningConfig};

/// Suffix of the temporary facts payload file.
pub const FACTS_FILE_SUFFIX: &str = ".facts_in.json";

/// Suffix of the run script file.
pub const RUN_SCRIPT_SUFFIX: &str = ".run.sh";

/// Agent run deadline when neither the caller nor the context sets one.
pub const DEFAULT_AGENT_DEADLINE: Duration = Duration::from_secs(3600);

/// Inputs to `run_agent`.
pub struct RunRequest<'a> {
    pub ctx: &'a HostContext,
    pub config: &'a ProvisioningConfig,
    pub layout: &'a AgentLayout,
    pub deadline: Duration,
}

/// What `run_agent` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Agent command line as written to the run script.
    pub command: String,
    /// Run script, left in place for inspection.
    pub script_path: PathBuf,
}

/// Name prefix shared by the facts file and the run script.
///
/// Node names and ids are caller-supplied; anything outside
/// `[A-Za-z0-9_.-]` becomes `_`.
#[must_use]
pub fn scratch_prefix(ctx: &HostContext) -> String {
    format!(
        "puppet.{}.{}.{}.",
        file_component(&ctx.node.node_name),
        file_component(&ctx.node.node_id),
        std::process::id()
    )
}

fn file_component(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Serialize the facts payload with 4-space indentation.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn facts_json(facts: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    facts.serialize(&mut ser).context("serializing facts")?;
    Ok(buf)
}

/// Build the facts payload, write the run script and trigger one agent run.
///
/// The facts file is removed whatever the outcome; the run script is kept.
///
/// # Errors
///
/// Returns a facts-collision error (before any file is created) if the
/// user facts claim the reserved key, or an elevation error if the agent
/// run fails.
pub async fn run_agent(
    sudo: &impl PrivilegedExecutor,
    scratch: &impl ScratchSpace,
    reporter: &impl ProgressReporter,
    req: &RunRequest<'_>,
) -> Result<RunReport> {
    let RunRequest {
        ctx,
        config,
        layout,
        deadline,
    } = *req;

    let facts = build_facts(config, ctx)?;
    let tags = run_tags(config, &ctx.operation);
    let command = agent_command(&tags);
    let cmdline = command.join(" ");

    let prefix = scratch_prefix(ctx);
    let facts_file = scratch
        .create(&prefix, FACTS_FILE_SUFFIX, &facts_json(&facts)?)
        .context("writing facts file")?;

    let script = run_script(&layout.custom_facts, &facts_file, &command)?;
    let script_path = scratch
        .create(&prefix, RUN_SCRIPT_SUFFIX, script.as_bytes())
        .context("writing run script")?
        .keep()
        .context("keeping run script")?;
    let script_arg = script_path.to_string_lossy();

    sudo.run("chmod", &["+x", &script_arg])
        .await
        .context("marking run script executable")?;

    info!("Will run: '{cmdline}' (in {})", script_path.display());
    reporter.step(&format!("running Puppet agent: {cmdline}"));
    let outcome = sudo
        .run_with_deadline(&script_arg, &[], deadline)
        .await
        .context("Puppet agent run");

    drop(facts_file);
    outcome?;

    reporter.success("Puppet agent run finished");
    Ok(RunReport {
        command: cmdline,
        script_path,
    })
}
