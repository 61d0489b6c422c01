//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

/// Every failure category a provisioning run can end in.
///
/// All of them are terminal: nothing is retried and nothing already done is
/// rolled back. Re-running the whole flow is the recovery path.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("{field} is missing")]
    MissingParam { field: String },

    #[error("{field} {reason}, you gave '{value}'")]
    InvalidParam {
        field: String,
        value: String,
        reason: String,
    },

    #[error("cannot select a provisioning strategy for this host: {0}")]
    PlatformResolution(String),

    #[error("cannot detect Linux distribution release for '{distro}'")]
    UnsupportedRelease { distro: String },

    #[error("repository package is not available (at {url}): {detail}")]
    Network { url: String, detail: String },

    #[error("command '{command}' failed with exit status {status}\nSTDOUT:\n{stdout}\nSTDERR:\n{stderr}")]
    Elevation {
        command: String,
        status: String,
        stdout: String,
        stderr: String,
    },

    #[error("Puppet facts must not contain the reserved key '{key}'")]
    FactsCollision { key: String },
}

impl ProvisionError {
    /// Short machine-readable name for the error category.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ProvisionError::MissingParam { .. } | ProvisionError::InvalidParam { .. } => {
                "parameter"
            }
            ProvisionError::PlatformResolution(_) => "platform_resolution",
            ProvisionError::UnsupportedRelease { .. } => "unsupported_release",
            ProvisionError::Network { .. } => "network",
            ProvisionError::Elevation { .. } => "elevation",
            ProvisionError::FactsCollision { .. } => "facts_collision",
        }
    }
}
