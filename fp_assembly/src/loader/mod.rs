//! Sources of per-CCD frames.

#[cfg(feature = "fits")]
pub mod fits;
pub mod memory;

use crate::error::{AssemblyError, Result};
use crate::sensor::SensorFrame;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads the raw array and CCD identifier stored at a path.
pub trait SensorLoader: Sync {
    fn load(&self, path: &Path) -> Result<SensorFrame>;
}

/// Parse a path list: one path per line, surrounding whitespace ignored,
/// blank lines skipped.
pub fn parse_path_list(text: &str) -> Vec<PathBuf> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Read a path list file.
pub fn read_path_list<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| AssemblyError::Io {
        context: format!("Failed to read path list {}", path.display()),
        source,
    })?;
    let paths = parse_path_list(&text);
    debug!("{} sensor paths listed in {}", paths.len(), path.display());
    Ok(paths)
}
