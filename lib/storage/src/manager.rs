use thumbprint_core::{Error, Result};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{error, info, warn};
use crate::persistence::JsonPersistence;
use crate::registry::FingerprintRegistry;

/// Configuration for the storage manager
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Directory holding the registry snapshot
    pub data_dir: PathBuf,
    /// How often modified entries are written out; `None` disables background saves
    pub save_interval: Option<Duration>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            save_interval: Some(Duration::from_secs(300)),
        }
    }
}

/// Owns the fingerprint registry and its persistence
pub struct StorageManager {
    registry: Arc<FingerprintRegistry>,
    persistence: Arc<JsonPersistence>,
    data_dir: PathBuf,
    shutdown: Arc<AtomicBool>,
    saver: Mutex<Option<JoinHandle<()>>>,
}

impl StorageManager {
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let data_dir = config.data_dir.clone();
        std::fs::create_dir_all(&data_dir)?;

        let persistence = Arc::new(JsonPersistence::new(&data_dir));

        let registry = match persistence
            .load()
            .map_err(|e| Error::Persistence(e.to_string()))?
        {
            Some(snapshot) => {
                info!(
                    "Loaded {} fingerprints from {:?}",
                    snapshot.entries.len(),
                    persistence.path()
                );
                FingerprintRegistry::from_entries(snapshot.entries)
            }
            None => FingerprintRegistry::new(),
        };

        let manager = Self {
            registry: Arc::new(registry),
            persistence,
            data_dir,
            shutdown: Arc::new(AtomicBool::new(false)),
            saver: Mutex::new(None),
        };

        if let Some(interval) = config.save_interval {
            manager.start_background_save(interval);
        }

        Ok(manager)
    }

    /// Start background save thread
    fn start_background_save(&self, interval: Duration) {
        let registry = self.registry.clone();
        let persistence = self.persistence.clone();
        let shutdown = self.shutdown.clone();

        let handle = std::thread::spawn(move || {
            while !shutdown.load(Ordering::Acquire) {
                std::thread::park_timeout(interval);
                if shutdown.load(Ordering::Acquire) {
                    break;
                }
                if registry.is_dirty() {
                    if let Err(e) = persist(&registry, &persistence) {
                        error!("Background save error: {}", e);
                    }
                }
            }
        });

        *self.saver.lock() = Some(handle);
    }

    #[inline]
    pub fn registry(&self) -> &Arc<FingerprintRegistry> {
        &self.registry
    }

    #[inline]
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Force save
    pub fn save(&self) -> Result<usize> {
        persist(&self.registry, &self.persistence)
    }

    /// Stop the background saver and write out pending changes
    pub fn shutdown(&self) -> Result<()> {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.saver.lock().take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                warn!("Background save thread panicked");
            }
        }
        if self.registry.is_dirty() {
            let saved = self.save()?;
            info!("Saved {} fingerprints on shutdown", saved);
        }
        Ok(())
    }
}

impl Drop for StorageManager {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.saver.lock().take() {
            handle.thread().unpark();
        }
    }
}

fn persist(registry: &FingerprintRegistry, persistence: &JsonPersistence) -> Result<usize> {
    let entries = registry.take_snapshot();
    persistence.save(entries).map_err(|e| {
        registry.mark_dirty();
        Error::Storage(e.to_string())
    })
}
