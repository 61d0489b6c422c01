//! Application service: platform strategy selection.
//!
//! Each OS family gets one strategy supplying the only family-specific
//! operations: where the repository package lives, how to install it, how
//! to install a named package and how to refresh the package cache.
//! Strategies are listed in a fixed registry; exactly one must match the
//! host.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::application::ports::{PrivilegedExecutor, RepoClient};
use crate::domain::config::RepoOverrides;
use crate::domain::error::ProvisionError;
use crate::domain::platform::{DEBIAN_IDS, OsRelease, RHEL_IDS};

/// Default agent version on Debian-family hosts.
pub const DEBIAN_DEFAULT_AGENT_VERSION: &str = "3.4.3-1puppetlabs1";

/// Packages RHEL-family hosts need on top of the agent.
pub const RHEL_EXTRA_PACKAGES: &[&str] = &["rubygem-json"];

/// OS-family-specific provisioning operations.
#[allow(async_fn_in_trait)]
pub trait PlatformStrategy {
    /// Registry name of the strategy.
    fn name(&self) -> &'static str;

    /// Packages installed after the agent.
    fn extra_packages(&self) -> &'static [&'static str];

    /// Agent version installed when the config pins none.
    fn default_agent_version(&self) -> Option<&'static str>;

    /// URL of the package that configures the Puppet repository.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedRelease` if the host release cannot be determined.
    fn repo_package_url(&self, repos: &RepoOverrides) -> Result<String>;

    /// Install the package found at `url`.
    async fn install_package_from_url(
        &self,
        sudo: &impl PrivilegedExecutor,
        repo: &impl RepoClient,
        url: &str,
    ) -> Result<()>;

    /// Install `name`, optionally pinned to `version`.
    async fn install_package(
        &self,
        sudo: &impl PrivilegedExecutor,
        name: &str,
        version: Option<&str>,
    ) -> Result<()>;

    /// Refresh the package manager's metadata. May be a no-op.
    async fn refresh_package_cache(&self, sudo: &impl PrivilegedExecutor) -> Result<()>;
}

// ── Debian family ─────────────────────────────────────────────────────────────

/// Debian, Ubuntu, Mint: `.deb` repository package, apt for the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebianStrategy {
    os: OsRelease,
    extra_packages: &'static [&'static str],
    default_version: Option<&'static str>,
}

impl DebianStrategy {
    #[must_use]
    pub fn new(os: &OsRelease) -> Self {
        Self {
            os: os.clone(),
            extra_packages: &[],
            default_version: Some(DEBIAN_DEFAULT_AGENT_VERSION),
        }
    }

    fn handles(os: &OsRelease) -> bool {
        os.is_family(DEBIAN_IDS)
    }
}

impl PlatformStrategy for DebianStrategy {
    fn name(&self) -> &'static str {
        "debian"
    }

    fn extra_packages(&self) -> &'static [&'static str] {
        self.extra_packages
    }

    fn default_agent_version(&self) -> Option<&'static str> {
        self.default_version
    }

    fn repo_package_url(&self, repos: &RepoOverrides) -> Result<String> {
        let release = self.os.debian_release()?;
        Ok(repos.deb.get(&release).cloned().unwrap_or_else(|| {
            format!("http://apt.puppetlabs.com/puppetlabs-release-{release}.deb")
        }))
    }

    async fn install_package_from_url(
        &self,
        sudo: &impl PrivilegedExecutor,
        repo: &impl RepoClient,
        url: &str,
    ) -> Result<()> {
        let package = repo.download(url).await?;
        info!(path = %package.display(), "using temp file for package installation");
        sudo.run("dpkg", &["-i", &package.to_string_lossy()])
            .await
            .context("installing repository package")?;
        Ok(())
    }

    async fn install_package(
        &self,
        sudo: &impl PrivilegedExecutor,
        name: &str,
        version: Option<&str>,
    ) -> Result<()> {
        let spec = match version {
            Some(v) => format!("{name}={v}"),
            None => name.to_string(),
        };
        sudo.run("apt-get", &["install", "-y", &spec])
            .await
            .with_context(|| format!("installing package {spec}"))?;
        Ok(())
    }

    async fn refresh_package_cache(&self, sudo: &impl PrivilegedExecutor) -> Result<()> {
        sudo.run("apt-get", &["update"])
            .await
            .context("refreshing package cache")?;
        Ok(())
    }
}

// ── RHEL family ───────────────────────────────────────────────────────────────

/// RHEL, CentOS, Fedora: `.rpm` repository package, yum for the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhelStrategy {
    os: OsRelease,
    extra_packages: &'static [&'static str],
    default_version: Option<&'static str>,
}

impl RhelStrategy {
    #[must_use]
    pub fn new(os: &OsRelease) -> Self {
        Self {
            os: os.clone(),
            extra_packages: RHEL_EXTRA_PACKAGES,
            default_version: None,
        }
    }

    fn handles(os: &OsRelease) -> bool {
        os.is_family(RHEL_IDS)
    }
}

impl PlatformStrategy for RhelStrategy {
    fn name(&self) -> &'static str {
        "rhel"
    }

    fn extra_packages(&self) -> &'static [&'static str] {
        self.extra_packages
    }

    fn default_agent_version(&self) -> Option<&'static str> {
        self.default_version
    }

    fn repo_package_url(&self, repos: &RepoOverrides) -> Result<String> {
        let major = self.os.major_release()?;
        if let Some(url) = repos.rpm.get(&major) {
            return Ok(url.clone());
        }
        let flavor = if self.os.id == "fedora" { "fedora" } else { "el" };
        Ok(format!(
            "http://yum.puppetlabs.com/puppetlabs-release-{flavor}-{major}.noarch.rpm"
        ))
    }

    async fn install_package_from_url(
        &self,
        sudo: &impl PrivilegedExecutor,
        _repo: &impl RepoClient,
        url: &str,
    ) -> Result<()> {
        // rpm fetches remote packages itself.
        sudo.run("rpm", &["-ivh", url])
            .await
            .context("installing repository package")?;
        Ok(())
    }

    async fn install_package(
        &self,
        sudo: &impl PrivilegedExecutor,
        name: &str,
        version: Option<&str>,
    ) -> Result<()> {
        let spec = match version {
            Some(v) => format!("{name}-{v}"),
            None => name.to_string(),
        };
        sudo.run("yum", &["install", "-y", &spec])
            .await
            .with_context(|| format!("installing package {spec}"))?;
        Ok(())
    }

    async fn refresh_package_cache(&self, _sudo: &impl PrivilegedExecutor) -> Result<()> {
        Ok(())
    }
}

// ── Selected strategy ─────────────────────────────────────────────────────────

/// The strategy chosen for this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Debian(DebianStrategy),
    Rhel(RhelStrategy),
}

impl PlatformStrategy for Platform {
    fn name(&self) -> &'static str {
        match self {
            Platform::Debian(s) => s.name(),
            Platform::Rhel(s) => s.name(),
        }
    }

    fn extra_packages(&self) -> &'static [&'static str] {
        match self {
            Platform::Debian(s) => s.extra_packages(),
            Platform::Rhel(s) => s.extra_packages(),
        }
    }

    fn default_agent_version(&self) -> Option<&'static str> {
        match self {
            Platform::Debian(s) => s.default_agent_version(),
            Platform::Rhel(s) => s.default_agent_version(),
        }
    }

    fn repo_package_url(&self, repos: &RepoOverrides) -> Result<String> {
        match self {
            Platform::Debian(s) => s.repo_package_url(repos),
            Platform::Rhel(s) => s.repo_package_url(repos),
        }
    }

    async fn install_package_from_url(
        &self,
        sudo: &impl PrivilegedExecutor,
        repo: &impl RepoClient,
        url: &str,
    ) -> Result<()> {
        match self {
            Platform::Debian(s) => s.install_package_from_url(sudo, repo, url).await,
            Platform::Rhel(s) => s.install_package_from_url(sudo, repo, url).await,
        }
    }

    async fn install_package(
        &self,
        sudo: &impl PrivilegedExecutor,
        name: &str,
        version: Option<&str>,
    ) -> Result<()> {
        match self {
            Platform::Debian(s) => s.install_package(sudo, name, version).await,
            Platform::Rhel(s) => s.install_package(sudo, name, version).await,
        }
    }

    async fn refresh_package_cache(&self, sudo: &impl PrivilegedExecutor) -> Result<()> {
        match self {
            Platform::Debian(s) => s.refresh_package_cache(sudo).await,
            Platform::Rhel(s) => s.refresh_package_cache(sudo).await,
        }
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// One registry slot: a detection predicate and a constructor.
#[derive(Clone, Copy)]
pub struct StrategyEntry {
    pub name: &'static str,
    pub handles: fn(&OsRelease) -> bool,
    pub build: fn(&OsRelease) -> Platform,
}

/// All known strategies, in resolution order.
pub const REGISTRY: &[StrategyEntry] = &[
    StrategyEntry {
        name: "debian",
        handles: DebianStrategy::handles,
        build: |os| Platform::Debian(DebianStrategy::new(os)),
    },
    StrategyEntry {
        name: "rhel",
        handles: RhelStrategy::handles,
        build: |os| Platform::Rhel(RhelStrategy::new(os)),
    },
];

/// Select the strategy for `os` from the built-in registry.
///
/// The registry itself is checked first so an ambiguous entry fails every
/// host, not just the ones it overlaps on.
///
/// # Errors
///
/// Returns `PlatformResolution` if zero or several strategies match.
pub fn resolve(os: &OsRelease) -> Result<Platform> {
    check_registry(REGISTRY)?;
    resolve_in(REGISTRY, os)
}

/// Select the single strategy in `registry` that handles `os`.
///
/// # Errors
///
/// Returns `PlatformResolution` if zero or several entries match.
pub fn resolve_in(registry: &[StrategyEntry], os: &OsRelease) -> Result<Platform> {
    let matches: Vec<&StrategyEntry> = registry.iter().filter(|e| (e.handles)(os)).collect();
    match matches.as_slice() {
        [entry] => {
            debug!(strategy = entry.name, distro = %os.id, "platform strategy selected");
            Ok((entry.build)(os))
        }
        [] => Err(ProvisionError::PlatformResolution(format!(
            "no strategy handles distribution '{}'",
            os.id
        ))
        .into()),
        many => Err(ProvisionError::PlatformResolution(format!(
            "distribution '{}' matches several strategies: {}",
            os.id,
            many.iter().map(|e| e.name).collect::<Vec<_>>().join(", ")
        ))
        .into()),
    }
}

/// Verify every known distribution id resolves to exactly one strategy.
///
/// # Errors
///
/// Returns the first `PlatformResolution` failure found.
pub fn check_registry(registry: &[StrategyEntry]) -> Result<()> {
    for id in DEBIAN_IDS.iter().chain(RHEL_IDS) {
        let os = OsRelease {
            id: (*id).to_string(),
            ..OsRelease::default()
        };
        resolve_in(registry, &os).with_context(|| format!("registry check for '{id}'"))?;
    }
    Ok(())
}
