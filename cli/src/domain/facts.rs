//! Facts payload and agent invocation for a single Puppet run.
//!
//! Pure construction only; writing the payload and running the agent is
//! the run service's job.

use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value, json};

use crate::domain::config::ProvisioningConfig;
use crate::domain::context::{HostContext, NodeContext};
use crate::domain::error::ProvisionError;

/// Top-level facts key carrying injected orchestration data.
pub const RESERVED_FACTS_KEY: &str = "cloudify";

/// Prefix of the tag generated for the triggering operation.
pub const OPERATION_TAG_PREFIX: &str = "cloudify_operation_";

/// Environment variable pointing facter at the custom facts directory.
pub const FACTERLIB_ENV: &str = "FACTERLIB";

/// Environment variable the custom facts script reads the payload from.
pub const FACTS_FILE_ENV: &str = "CLOUDIFY_FACTS_FILE";

/// Base agent command line: one run, foreground, console + syslog.
pub const AGENT_BASE_COMMAND: &[&str] = &[
    "puppet",
    "agent",
    "--onetime",
    "--no-daemonize",
    "--logdest",
    "console",
    "--logdest",
    "syslog",
];

/// Snapshot of one node for the facts payload.
#[must_use]
pub fn node_struct(node: &NodeContext) -> Value {
    json!({
        "node_id": node.node_id,
        "node_name": node.node_name,
        "blueprint_id": node.blueprint_id,
        "deployment_id": node.deployment_id,
        "properties": node.properties,
        "runtime_properties": node.runtime_properties,
        "capabilities": node.capabilities,
    })
}

/// Reject user-declared facts that claim the reserved key.
///
/// # Errors
///
/// Returns `FactsCollision` if `RESERVED_FACTS_KEY` is present.
pub fn check_user_facts(facts: &Map<String, Value>) -> Result<()> {
    if facts.contains_key(RESERVED_FACTS_KEY) {
        return Err(ProvisionError::FactsCollision {
            key: RESERVED_FACTS_KEY.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Build the facts payload: user facts at the top level, orchestration data
/// under `RESERVED_FACTS_KEY`, related node nested under `related`.
///
/// # Errors
///
/// Returns `FactsCollision` if the user facts claim the reserved key.
pub fn build_facts(config: &ProvisioningConfig, ctx: &HostContext) -> Result<Value> {
    check_user_facts(&config.facts)?;

    let mut injected = node_struct(&ctx.node);
    if let (Some(related), Value::Object(obj)) = (&ctx.related, &mut injected) {
        obj.insert("related".to_string(), node_struct(related));
    }

    let mut facts = config.facts.clone();
    facts.insert(RESERVED_FACTS_KEY.to_string(), injected);
    Ok(Value::Object(facts))
}

/// Declared tags followed by the operation tag, when requested.
#[must_use]
pub fn run_tags(config: &ProvisioningConfig, operation: &str) -> Vec<String> {
    let mut tags = config.tags.clone();
    if config.add_operation_tag {
        tags.push(format!("{OPERATION_TAG_PREFIX}{operation}"));
    }
    tags
}

/// Full agent command line for one run.
#[must_use]
pub fn agent_command(tags: &[String]) -> Vec<String> {
    let mut cmd: Vec<String> = AGENT_BASE_COMMAND.iter().map(|s| (*s).to_string()).collect();
    if !tags.is_empty() {
        cmd.push("--tags".to_string());
        cmd.push(tags.join(","));
    }
    cmd
}

/// Quote one word for the run script's shell.
fn shell_word(word: &str) -> Result<Cow<'_, str>> {
    shlex::try_quote(word).with_context(|| format!("cannot quote {word:?} for the run script"))
}

fn shell_path(path: &Path) -> Result<Cow<'_, str>> {
    let word = path
        .to_str()
        .with_context(|| format!("non-UTF-8 path {} in the run script", path.display()))?;
    shell_word(word)
}

/// Shell script that exports the facts locations and runs the agent.
/// Every interpolated word is shell-quoted.
///
/// # Errors
///
/// Returns an error if a path is not UTF-8 or a word cannot be quoted
/// (it contains a NUL byte).
pub fn run_script(facts_dir: &Path, facts_file: &Path, command: &[String]) -> Result<String> {
    let words = command
        .iter()
        .map(String::as_str)
        .map(shell_word)
        .collect::<Result<Vec<_>>>()?;
    Ok(format!(
        "#!/bin/bash -e\nexport {FACTERLIB_ENV}={}\nexport {FACTS_FILE_ENV}={}\n{}\n",
        shell_path(facts_dir)?,
        shell_path(facts_file)?,
        words.join(" ")
    ))
}
