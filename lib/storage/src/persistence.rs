use anyhow::Result;
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use crate::registry::FingerprintEntry;

const SNAPSHOT_FILENAME: &str = "registry.json";

/// On-disk form of the registry
#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub entries: Vec<FingerprintEntry>,
}

/// JSON snapshot persistence.
/// Writes go to a temporary file that is renamed over the snapshot, so a crash
/// mid-save leaves the previous snapshot intact.
pub struct JsonPersistence {
    path: PathBuf,
}

impl JsonPersistence {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            path: data_dir.as_ref().join(SNAPSHOT_FILENAME),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all entries atomically
    pub fn save(&self, entries: Vec<FingerprintEntry>) -> Result<usize> {
        let count = entries.len();
        let snapshot = RegistrySnapshot {
            version: 1,
            saved_at: Utc::now(),
            entries,
        };
        let data = serde_json::to_vec(&snapshot)?;

        AtomicFile::new(&self.path, OverwriteBehavior::AllowOverwrite)
            .write(|f| f.write_all(&data))?;
        Ok(count)
    }

    /// Load the snapshot from disk (on startup)
    pub fn load(&self) -> Result<Option<RegistrySnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let data = std::fs::read(&self.path)?;
        let snapshot: RegistrySnapshot = serde_json::from_slice(&data)
            .map_err(|e| anyhow::anyhow!("Deserialization error: {}", e))?;
        Ok(Some(snapshot))
    }
}
