//! Host context loading from a JSON or YAML document.

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::HostContext;

/// Load the orchestration host context from `path`.
///
/// `.yaml`/`.yml` files are parsed as YAML, anything else as JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_context(path: &Path) -> Result<HostContext> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading host context {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    if is_yaml {
        serde_yaml::from_str(&text)
            .with_context(|| format!("parsing host context {}", path.display()))
    } else {
        serde_json::from_str(&text)
            .with_context(|| format!("parsing host context {}", path.display()))
    }
}
