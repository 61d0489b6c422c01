//! Scratch files: implements `ScratchSpace` with `tempfile`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tempfile::TempPath;

use crate::application::ports::ScratchSpace;

/// Creates private (0600) temp files, by default in the system temp dir.
#[derive(Debug, Default)]
pub struct TempScratch {
    dir: Option<PathBuf>,
}

impl TempScratch {
    /// Place scratch files in `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }
}

impl ScratchSpace for TempScratch {
    fn create(&self, prefix: &str, suffix: &str, contents: &[u8]) -> Result<TempPath> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix).suffix(suffix);
        let mut file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .with_context(|| format!("creating temp file {prefix}*{suffix}"))?;
        file.write_all(contents)
            .and_then(|()| file.flush())
            .with_context(|| format!("writing {}", file.path().display()))?;
        Ok(file.into_temp_path())
    }
}
