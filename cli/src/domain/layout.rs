//! Fixed on-disk layout of a provisioned Puppet agent.

use std::path::{Path, PathBuf};

/// Local module repository, relative to the invoking user's home.
pub const LOCAL_REPO_REL: &str = "cloudify/puppet";
pub const CUSTOM_FACTS_DIR: &str = "/opt/cloudify/puppet/facts";
pub const EXTENSION_MODULE_DIR: &str = "/opt/cloudify/puppet/modules/cloudify";
pub const AGENT_CONFIG_PATH: &str = "/etc/puppet/puppet.conf";
pub const CUSTOM_FACTS_SCRIPT_NAME: &str = "cloudify_facts.rb";

/// Custom facts script installed into the facts directory.
pub const CUSTOM_FACTS_SCRIPT: &str = include_str!("../../assets/cloudify_facts.rb");

/// Owner-only mode applied to every working directory.
pub const WORK_DIR_MODE: &str = "700";

/// Resolved directories and files used by install and run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentLayout {
    pub local_repo: PathBuf,
    pub custom_facts: PathBuf,
    pub extension_module: PathBuf,
    pub config_path: PathBuf,
}

impl AgentLayout {
    /// Standard layout with the local repository under `home`.
    #[must_use]
    pub fn new(home: &Path) -> Self {
        Self {
            local_repo: home.join(LOCAL_REPO_REL),
            custom_facts: PathBuf::from(CUSTOM_FACTS_DIR),
            extension_module: PathBuf::from(EXTENSION_MODULE_DIR),
            config_path: PathBuf::from(AGENT_CONFIG_PATH),
        }
    }

    /// Module path local to this run, appended last to the search path.
    #[must_use]
    pub fn local_modules(&self) -> PathBuf {
        self.local_repo.join("modules")
    }

    /// Destination of the bundled custom-facts script.
    #[must_use]
    pub fn custom_facts_script(&self) -> PathBuf {
        self.custom_facts.join(CUSTOM_FACTS_SCRIPT_NAME)
    }

    /// Directories created and locked down during install, in order.
    #[must_use]
    pub fn work_dirs(&self) -> [&Path; 3] {
        [&self.local_repo, &self.custom_facts, &self.extension_module]
    }
}
