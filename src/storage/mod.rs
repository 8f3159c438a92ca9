//! On-disk layout for snapshot data.
//!
//! A snapshot lives at `<data dir>/snapshots/<timestamp>/` and contains the
//! JSON collections, a metadata record, and the rendered Markdown reports.
//! Writes are plain file writes, not transactional: a directory missing
//! files is indistinguishable from one still being written and should not
//! be trusted by readers.

use crate::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Create a directory (and parents) if it does not exist.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Write a value as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json)?;
    Ok(())
}

/// Read and deserialize a JSON file, attaching the path to read failures.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .map_err(|e| Error::InvalidInput(format!("Failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| Error::InvalidInput(format!("Failed to parse {}: {e}", path.display())))
}

/// Directory for a snapshot keyed by its timestamp string.
pub fn snapshot_dir(base_dir: &Path, timestamp: &str) -> PathBuf {
    base_dir.join("snapshots").join(timestamp)
}

/// Default data directory: `<platform data dir>/todosnap`, falling back to
/// `./todosnap_data` when no platform directory is available.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("todosnap"))
        .unwrap_or_else(|| PathBuf::from("./todosnap_data"))
}
