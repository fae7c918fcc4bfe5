use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::BlobStore;

/// In-process store for dry runs and tests
#[derive(Default)]
pub struct MemoryStore {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
    commits: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.blobs
            .lock()
            .map(|blobs| blobs.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn read(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.lock().ok()?.get(key).cloned()
    }

    /// Commit messages of every write, oldest first
    pub fn commits(&self) -> Vec<String> {
        self.commits
            .lock()
            .map(|commits| commits.clone())
            .unwrap_or_default()
    }
}

impl BlobStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let blobs = self.blobs.lock().map_err(|_| anyhow!("Memory store lock poisoned"))?;
        Ok(blobs.get(key).cloned())
    }

    async fn put(&self, key: &str, content: &[u8], message: &str) -> Result<()> {
        self.blobs
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?
            .insert(key.to_string(), content.to_vec());
        self.commits
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?
            .push(message.to_string());
        Ok(())
    }
}
