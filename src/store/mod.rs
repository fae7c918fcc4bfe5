use anyhow::Result;
use std::future::Future;

use crate::config::settings::{AppConfig, StoreKind};

pub mod github;
pub mod local;
pub mod memory;

pub use github::GithubStore;
pub use local::LocalStore;
pub use memory::MemoryStore;

/// Durable key/value blob storage holding states and reports
pub trait BlobStore {
    /// `Ok(None)` when nothing is stored under `key`
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Replace the whole document under `key`
    fn put(&self, key: &str, content: &[u8], message: &str) -> impl Future<Output = Result<()>> + Send;

    /// Address readers can open for `key`, when the store serves one
    fn public_url(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Store picked from configuration at startup
pub enum StoreBackend {
    Github(GithubStore),
    Local(LocalStore),
    Memory(MemoryStore),
}

impl StoreBackend {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let backend = match config.store.kind {
            StoreKind::Github => StoreBackend::Github(GithubStore::new(&config.store, &config.http)?),
            StoreKind::Local => StoreBackend::Local(LocalStore::new(&config.store.local_dir)?),
            StoreKind::Memory => StoreBackend::Memory(MemoryStore::new()),
        };
        Ok(backend)
    }
}

impl BlobStore for StoreBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self {
            StoreBackend::Github(store) => store.get(key).await,
            StoreBackend::Local(store) => store.get(key).await,
            StoreBackend::Memory(store) => store.get(key).await,
        }
    }

    async fn put(&self, key: &str, content: &[u8], message: &str) -> Result<()> {
        match self {
            StoreBackend::Github(store) => store.put(key, content, message).await,
            StoreBackend::Local(store) => store.put(key, content, message).await,
            StoreBackend::Memory(store) => store.put(key, content, message).await,
        }
    }

    fn public_url(&self, key: &str) -> Option<String> {
        match self {
            StoreBackend::Github(store) => store.public_url(key),
            StoreBackend::Local(store) => store.public_url(key),
            StoreBackend::Memory(store) => store.public_url(key),
        }
    }
}
