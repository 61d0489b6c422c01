//! Host inspection: implements `HostInspector` from `/etc` files.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::HostInspector;
use crate::domain::platform::OsRelease;

/// Reads `os-release` and `debian_version` below a filesystem root.
pub struct EtcHostInspector {
    root: PathBuf,
}

impl EtcHostInspector {
    /// Inspect the running system.
    #[must_use]
    pub fn system() -> Self {
        Self::with_root("/")
    }

    /// Inspect a system image mounted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_optional(&self, rel: &str) -> Result<Option<String>> {
        let path = self.root.join(rel);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }
}

impl HostInspector for EtcHostInspector {
    fn os_release(&self) -> Result<OsRelease> {
        let text = match self.read_optional("etc/os-release")? {
            Some(text) => text,
            None => self
                .read_optional("usr/lib/os-release")?
                .with_context(|| format!("no os-release file under {}", self.root.display()))?,
        };
        let debian_version = self.read_optional("etc/debian_version")?;
        Ok(OsRelease::parse(&text, debian_version.as_deref()))
    }
}
