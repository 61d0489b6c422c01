//! Node naming as seen by the Puppet master.

use chrono::{DateTime, Utc};

use crate::domain::config::ProvisioningConfig;

/// Timestamp prefix format for certificate names.
pub const CERTNAME_TIME_FORMAT: &str = "%Y%m%d%H%M";

/// Names this node presents to the Puppet master.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    /// `prefix + node_id + suffix`.
    pub node_name: String,
    /// UTC timestamp followed by the node name, so re-provisioning a node
    /// never collides with a certificate already signed for it.
    pub certname: String,
}

impl NodeIdentity {
    /// Derive the identity for `node_id` at time `now`.
    #[must_use]
    pub fn derive(config: &ProvisioningConfig, node_id: &str, now: DateTime<Utc>) -> Self {
        let node_name = format!(
            "{}{node_id}{}",
            config.node_name_prefix, config.node_name_suffix
        );
        let certname = format!("{}-{node_name}", now.format(CERTNAME_TIME_FORMAT));
        Self {
            node_name,
            certname,
        }
    }
}
