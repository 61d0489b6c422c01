//! Host platform description and release resolution.
//!
//! Parsing works on file text handed in by the caller; nothing here reads
//! the filesystem.

use std::collections::HashMap;

use anyhow::Result;

use crate::domain::error::ProvisionError;

/// Distribution ids handled by the Debian-family strategy.
pub const DEBIAN_IDS: &[&str] = &["debian", "ubuntu", "linuxmint", "mint"];

/// Distribution ids handled by the RHEL-family strategy.
pub const RHEL_IDS: &[&str] = &["rhel", "redhat", "centos", "fedora"];

/// What the host says about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    /// Lower-cased distribution id (`ubuntu`, `centos`, ...).
    pub id: String,
    /// Parent distributions from `ID_LIKE`, nearest first.
    pub id_like: Vec<String>,
    pub version_id: Option<String>,
    pub version_codename: Option<String>,
    /// Contents of `/etc/debian_version`, when present.
    pub debian_version: Option<String>,
}

impl OsRelease {
    /// Parse `/etc/os-release` text plus the optional Debian version hint.
    #[must_use]
    pub fn parse(os_release: &str, debian_version: Option<&str>) -> Self {
        let fields: HashMap<&str, String> = os_release
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .filter_map(|l| l.split_once('='))
            .map(|(k, v)| (k.trim(), unquote(v.trim())))
            .collect();

        let non_empty = |key: &str| fields.get(key).filter(|v| !v.is_empty()).cloned();

        Self {
            id: fields
                .get("ID")
                .map(|v| v.to_ascii_lowercase())
                .unwrap_or_default(),
            id_like: fields
                .get("ID_LIKE")
                .map(|v| v.split_whitespace().map(str::to_ascii_lowercase).collect())
                .unwrap_or_default(),
            version_id: non_empty("VERSION_ID"),
            version_codename: non_empty("VERSION_CODENAME"),
            debian_version: debian_version
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        }
    }

    /// Whether the host belongs to the family whose ids are `family`.
    ///
    /// A known id decides on its own. A derivative with an unknown id
    /// (Rocky, Pop!_OS, ...) belongs to the family named in its `ID_LIKE`.
    #[must_use]
    pub fn is_family(&self, family: &[&str]) -> bool {
        if family.contains(&self.id.as_str()) {
            return true;
        }
        let known = DEBIAN_IDS.iter().chain(RHEL_IDS).any(|id| *id == self.id);
        !known && self.id_like.iter().any(|like| family.contains(&like.as_str()))
    }

    /// Debian-family release name used to pick the repository package.
    ///
    /// The codename wins; a rolling `*/sid` system falls back to `sid`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedRelease` if neither is available.
    pub fn debian_release(&self) -> Result<String> {
        if let Some(codename) = &self.version_codename {
            return Ok(codename.clone());
        }
        if self
            .debian_version
            .as_deref()
            .is_some_and(|v| v.ends_with("/sid"))
        {
            return Ok("sid".to_string());
        }
        Err(self.unsupported())
    }

    /// Major release number for RHEL-family hosts (`7.9` → `7`).
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedRelease` if `VERSION_ID` is absent.
    pub fn major_release(&self) -> Result<String> {
        let version = self.version_id.as_deref().ok_or_else(|| self.unsupported())?;
        let major = version.split('.').next().unwrap_or(version);
        if major.is_empty() {
            return Err(self.unsupported());
        }
        Ok(major.to_string())
    }

    fn unsupported(&self) -> anyhow::Error {
        ProvisionError::UnsupportedRelease {
            distro: self.id.clone(),
        }
        .into()
    }
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value)
        .to_string()
}

/// Last path segment of a URL, ignoring query and fragment.
#[must_use]
pub fn url_basename(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let path = path.split_once("://").map_or(path, |(_, rest)| rest);
    match path.split_once('/') {
        Some((_, p)) => p.rsplit('/').next().unwrap_or(""),
        None => "",
    }
}
