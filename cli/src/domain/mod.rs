//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod context;
pub mod error;
pub mod facts;
pub mod identity;
pub mod layout;
pub mod platform;
pub mod render;

pub use config::{ProvisioningConfig, PuppetConfigInput, RepoOverrides, validate};
pub use context::{HostContext, NodeContext};
pub use error::ProvisionError;
pub use identity::NodeIdentity;
pub use layout::AgentLayout;
pub use platform::OsRelease;
