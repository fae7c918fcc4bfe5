use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use super::BlobStore;
use crate::errors::{read_context, write_context};

/// Directory-backed store; keys are relative paths below the root
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).context("Failed to create store directory")?;
        Ok(Self { root })
    }

    fn build_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let is_plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !is_plain {
            bail!("Invalid store key: {}", key);
        }
        Ok(self.root.join(relative))
    }
}

impl BlobStore for LocalStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.build_path(key)?;
        if !fs::try_exists(&path).await.with_context(|| read_context(key))? {
            return Ok(None);
        }

        let content = fs::read(&path).await.with_context(|| read_context(key))?;
        debug!("Loaded {} bytes from {}", content.len(), path.display());
        Ok(Some(content))
    }

    async fn put(&self, key: &str, content: &[u8], message: &str) -> Result<()> {
        let path = self.build_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| write_context(key))?;
        }

        fs::write(&path, content)
            .await
            .with_context(|| write_context(key))?;

        info!("Saved {} ({})", path.display(), message);
        Ok(())
    }
}
