//! Agent configuration rendering.
//!
//! Pure template substitution; the caller writes the result.

use crate::domain::identity::NodeIdentity;

/// System module directories, searched before the run-local one.
pub const SYSTEM_MODULE_PATH: &[&str] = &[
    "/etc/puppet/modules",
    "/usr/share/puppet/modules",
    "/opt/cloudify/puppet/modules",
];

const HEADER: &str = "# This file was generated by Cloudify";

/// Inputs to `render_agent_config`.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub environment: &'a str,
    pub server: &'a str,
    pub identity: &'a NodeIdentity,
    /// Run-local module path, appended after `SYSTEM_MODULE_PATH`.
    pub local_modules: &'a str,
}

/// Colon-joined module search path.
#[must_use]
pub fn module_path(local_modules: &str) -> String {
    SYSTEM_MODULE_PATH
        .iter()
        .copied()
        .chain(std::iter::once(local_modules))
        .collect::<Vec<_>>()
        .join(":")
}

/// Render `puppet.conf`.
#[must_use]
pub fn render_agent_config(input: &RenderInput<'_>) -> String {
    let RenderInput {
        environment,
        server,
        identity,
        local_modules,
    } = *input;
    let modulepath = module_path(local_modules);
    format!(
        "{HEADER}
[main]
    ssldir = /var/lib/puppet/ssl
    environment = {environment}
    pluginsync = true
    logdir = /var/log/puppet
    vardir = /var/lib/puppet
    classfile = $vardir/classes.txt
    factpath = /opt/cloudify/puppet/facts:$vardir/lib/facter:$vardir/facts
    modulepath = {modulepath}

[agent]
    server = {server}
    certname = {certname}
    node_name_value = {node_name}
",
        certname = identity.certname,
        node_name = identity.node_name,
    )
}
