//! Provisioning parameters and the validator that gates them.
//!
//! Pure functions only: no I/O, no async, no filesystem access. Nothing
//! reaches the OS before `validate` has accepted the input.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::context::{HostContext, PUPPET_CONFIG_KEY};
use crate::domain::error::ProvisionError;

// ── Patterns ─────────────────────────────────────────────────────────────────

/// Puppet tag syntax (see the Puppet "reserved words and names" reference).
pub static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\A[a-z0-9_][a-z0-9_:.\-]*\z").expect("valid regex")
});

/// Puppet environment names, after separator normalization.
pub static ENVIRONMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\A[a-z0-9_]+\z").expect("valid regex")
});

/// Characters in an environment name that are folded into `_`.
pub const ENVIRONMENT_SEPARATORS: &[char] = &[' ', '.', '-'];

// ── Raw input ────────────────────────────────────────────────────────────────

/// Per-platform repository package URL overrides, keyed by release.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RepoOverrides {
    /// Debian-family overrides keyed by codename (`trusty`, `sid`, ...).
    pub deb: BTreeMap<String, String>,
    /// RHEL-family overrides keyed by major release (`6`, `7`, ...).
    pub rpm: BTreeMap<String, String>,
}

/// The `puppet_config` block exactly as declared, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PuppetConfigInput {
    pub environment: Option<String>,
    pub server: Option<String>,
    pub tags: Vec<String>,
    pub node_name_prefix: Option<String>,
    pub node_name_suffix: Option<String>,
    pub repos: RepoOverrides,
    pub version: Option<String>,
    pub facts: Map<String, Value>,
    pub add_operation_tag: bool,
}

// ── Validated config ─────────────────────────────────────────────────────────

/// Validated provisioning parameters. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisioningConfig {
    /// Normalized environment name.
    pub environment: String,
    pub server: String,
    pub tags: Vec<String>,
    pub node_name_prefix: String,
    pub node_name_suffix: String,
    pub repos: RepoOverrides,
    /// Agent package version pin; `None` uses the platform default.
    pub version: Option<String>,
    /// User-declared static facts.
    pub facts: Map<String, Value>,
    pub add_operation_tag: bool,
}

impl ProvisioningConfig {
    /// Extract and validate the `puppet_config` block from a host context.
    ///
    /// # Errors
    ///
    /// Returns a parameter error if the block is absent, malformed, or fails
    /// validation.
    pub fn from_context(ctx: &HostContext) -> Result<Self> {
        let raw = ctx.puppet_config().ok_or_else(|| ProvisionError::MissingParam {
            field: PUPPET_CONFIG_KEY.to_string(),
        })?;
        let input: PuppetConfigInput =
            serde_json::from_value(raw.clone()).map_err(|e| ProvisionError::InvalidParam {
                field: PUPPET_CONFIG_KEY.to_string(),
                value: raw.to_string(),
                reason: format!("is malformed ({e})"),
            })?;
        validate(input)
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Fold spaces, dots and hyphens into underscores and lower-case ASCII.
#[must_use]
pub fn normalize_environment(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if ENVIRONMENT_SEPARATORS.contains(&c) {
                '_'
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

/// Normalize and check an environment name.
///
/// # Errors
///
/// Returns a parameter error carrying the raw value if the normalized name
/// is empty or contains anything outside `[a-z0-9_]`.
pub fn validate_environment(raw: &str) -> Result<String> {
    let env = normalize_environment(raw);
    if !ENVIRONMENT_RE.is_match(&env) {
        return Err(ProvisionError::InvalidParam {
            field: format!("{PUPPET_CONFIG_KEY}.environment"),
            value: raw.to_string(),
            reason: "must contain only alphanumeric characters or underscores".to_string(),
        }
        .into());
    }
    Ok(env)
}

/// Check a single tag against the Puppet tag syntax.
///
/// # Errors
///
/// Returns a parameter error carrying the tag if it does not match.
pub fn validate_tag(tag: &str) -> Result<()> {
    if !TAG_RE.is_match(tag) {
        return Err(ProvisionError::InvalidParam {
            field: format!("{PUPPET_CONFIG_KEY}.tags[*]"),
            value: tag.to_string(),
            reason: format!("must match {}", TAG_RE.as_str()),
        }
        .into());
    }
    Ok(())
}

/// Validate a raw `puppet_config` block.
///
/// Checks run in a fixed order: environment, tags, server. The first
/// violation is reported.
///
/// # Errors
///
/// Returns a parameter error naming the offending field and its raw value.
pub fn validate(input: PuppetConfigInput) -> Result<ProvisioningConfig> {
    let raw_env = input.environment.ok_or_else(|| ProvisionError::MissingParam {
        field: format!("{PUPPET_CONFIG_KEY}.environment"),
    })?;
    let environment = validate_environment(&raw_env)?;

    for tag in &input.tags {
        validate_tag(tag)?;
    }

    let server = input
        .server
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ProvisionError::MissingParam {
            field: format!("{PUPPET_CONFIG_KEY}.server"),
        })?;

    Ok(ProvisioningConfig {
        environment,
        server,
        tags: input.tags,
        node_name_prefix: input.node_name_prefix.unwrap_or_default(),
        node_name_suffix: input.node_name_suffix.unwrap_or_default(),
        repos: input.repos,
        version: input.version,
        facts: input.facts,
        add_operation_tag: input.add_operation_tag,
    })
}

// ── Unit tests ───────────────────────────────────────────────────────────────
