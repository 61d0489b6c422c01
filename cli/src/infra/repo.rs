//! Repository infrastructure: implements `RepoClient` over blocking `ureq`.
//!
//! Requests run on tokio's blocking pool so the caller's runtime is never
//! stalled, and every request carries an explicit timeout.

use std::io::{Read, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tempfile::TempPath;
use tracing::info;

use crate::application::ports::RepoClient;
use crate::domain::error::ProvisionError;
use crate::domain::platform::url_basename;

/// Default `--http-timeout-secs`.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on a downloaded repository package.
pub const MAX_PACKAGE_BYTES: u64 = 512 * 1024 * 1024;

/// `RepoClient` backed by a shared `ureq::Agent`.
pub struct UreqRepoClient {
    agent: ureq::Agent,
}

impl UreqRepoClient {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("puppet-provision/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }
}

fn network_error(url: &str, detail: impl Into<String>) -> anyhow::Error {
    ProvisionError::Network {
        url: url.to_string(),
        detail: detail.into(),
    }
    .into()
}

fn describe(err: &ureq::Error) -> String {
    match err {
        ureq::Error::Status(code, _) => format!("HTTP {code}"),
        ureq::Error::Transport(t) => t.to_string(),
    }
}

impl RepoClient for UreqRepoClient {
    async fn probe(&self, url: &str) -> Result<()> {
        let agent = self.agent.clone();
        let target = url.to_string();
        let status = tokio::task::spawn_blocking(move || {
            agent.head(&target).call().map(|resp| resp.status())
        })
        .await
        .context("spawn_blocking for repository probe")?;

        match status {
            Ok(200) => Ok(()),
            Ok(code) => Err(network_error(url, format!("HTTP {code}"))),
            Err(e) => Err(network_error(url, describe(&e))),
        }
    }

    async fn download(&self, url: &str) -> Result<TempPath> {
        let agent = self.agent.clone();
        let target = url.to_string();
        let suffix = format!(".{}", url_basename(url));
        tokio::task::spawn_blocking(move || fetch_to_temp(&agent, &target, &suffix))
            .await
            .context("spawn_blocking for repository download")?
    }
}

fn fetch_to_temp(agent: &ureq::Agent, url: &str, suffix: &str) -> Result<TempPath> {
    let response = agent
        .get(url)
        .call()
        .map_err(|e| network_error(url, describe(&e)))?;

    let mut file = tempfile::Builder::new()
        .prefix("puppet-repo.")
        .suffix(suffix)
        .tempfile()
        .context("creating package temp file")?;

    let (total, sha256) = copy_capped(response.into_reader(), &mut file, MAX_PACKAGE_BYTES, url)?;
    file.flush().context("flushing package temp file")?;

    let path = file.into_temp_path();
    info!(
        %url,
        path = %path.display(),
        bytes = total,
        %sha256,
        "downloaded repository package"
    );
    Ok(path)
}

/// Copy at most `limit` bytes from `reader` into `out`, hashing as it goes.
///
/// Returns the byte count and the hex SHA-256 of what was copied.
///
/// # Errors
///
/// Returns `ProvisionError::Network` if the body is longer than `limit` or
/// cannot be read.
fn copy_capped(
    reader: impl Read,
    out: &mut impl Write,
    limit: u64,
    url: &str,
) -> Result<(u64, String)> {
    // One byte past the cap tells an oversized body from an exact fit.
    let mut reader = reader.take(limit + 1);
    let mut hasher = Sha256::new();
    let mut total: u64 = 0;
    let mut buf = vec![0u8; 65536];
    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| network_error(url, e.to_string()))?;
        if n == 0 {
            break;
        }
        total += n as u64;
        if total > limit {
            return Err(network_error(
                url,
                format!("package exceeds limit of {limit} bytes"),
            ));
        }
        hasher.update(&buf[..n]);
        out.write_all(&buf[..n]).context("writing package temp file")?;
    }
    Ok((total, format!("{:x}", hasher.finalize())))
}
