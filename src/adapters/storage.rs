use crate::domain::ports::Storage;
use crate::utils::error::Result;
use crate::utils::validation::validate_record_id;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One `{key}.json` file per key under a base directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Keys become file names, so anything that could leave `base_path` is refused.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_record_id("storage key", key)?;
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

impl Storage for LocalStorage {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(key)?).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        let full_path = self.path_for(key)?;

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        tracing::debug!("💾 wrote {} ({} bytes)", full_path.display(), data.len());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(key)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Storage for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.lock().await.get(key).cloned())
    }

    async fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        self.data.lock().await.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.data.lock().await.remove(key);
        Ok(())
    }
}
