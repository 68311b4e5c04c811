use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;
use tracing::{debug, info};

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()>;
}

/// Flat directory of uploaded files, served back under `/uploads`.
#[derive(Clone, Debug)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    /// Creates the directory when it is missing. Safe to call repeatedly.
    pub async fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        if tokio::fs::metadata(&root).await.is_err() {
            tokio::fs::create_dir_all(&root)
                .await
                .with_context(|| format!("create upload dir {}", root.display()))?;
            info!(dir = %root.display(), "created upload directory");
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl StorageClient for DiskStorage {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()> {
        let path = self.root.join(key);
        let len = body.len();
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        debug!(key, bytes = len, "object stored");
        Ok(())
    }
}
