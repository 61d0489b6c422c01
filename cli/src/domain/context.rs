//! Shape of the orchestration host context this tool is invoked with.
//!
//! The orchestrator hands over node identity, declared and runtime
//! properties, capability values and, optionally, one related node. Only
//! the fields below are read.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under `properties` holding the provisioning parameters.
pub const PUPPET_CONFIG_KEY: &str = "puppet_config";

/// Operation name assumed when the context does not carry one.
pub const DEFAULT_OPERATION: &str = "create";

/// Identity and state of a single orchestrated node.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeContext {
    pub node_id: String,
    #[serde(default)]
    pub node_name: String,
    #[serde(default)]
    pub blueprint_id: String,
    #[serde(default)]
    pub deployment_id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub runtime_properties: Map<String, Value>,
    #[serde(default)]
    pub capabilities: Map<String, Value>,
}

/// The full context for one provisioning invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HostContext {
    #[serde(flatten)]
    pub node: NodeContext,
    /// Lifecycle operation that triggered this invocation.
    #[serde(default = "default_operation")]
    pub operation: String,
    /// Related node, for relationship operations.
    #[serde(default)]
    pub related: Option<NodeContext>,
    /// Deadline for the agent run, in seconds.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

fn default_operation() -> String {
    DEFAULT_OPERATION.to_string()
}

impl HostContext {
    /// The raw `puppet_config` block, if declared.
    #[must_use]
    pub fn puppet_config(&self) -> Option<&Value> {
        self.node.properties.get(PUPPET_CONFIG_KEY)
    }
}
