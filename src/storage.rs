//! Filesystem blob storage for uploaded documents.
//!
//! Blobs live under a single root directory, keyed by a random id so
//! uploaded file names never touch the filesystem. Metadata stays in the
//! database; this layer only moves bytes.

use crate::errors::Result;
use std::path::PathBuf;
use tracing::debug;

/// A directory-backed blob store.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of a blob inside the store.
    #[must_use]
    pub fn path(&self, blob_id: &str) -> PathBuf {
        self.root.join(blob_id)
    }

    /// Writes bytes as a new blob and returns its id.
    pub async fn put(&self, bytes: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.root).await?;
        let blob_id = uuid::Uuid::new_v4().to_string();
        tokio::fs::write(self.path(&blob_id), bytes).await?;
        debug!("Stored blob {blob_id} ({} bytes)", bytes.len());
        Ok(blob_id)
    }

    /// Reads a blob's bytes.
    pub async fn get(&self, blob_id: &str) -> Result<Vec<u8>> {
        tokio::fs::read(self.path(blob_id)).await.map_err(Into::into)
    }

    /// Deletes a blob. Missing blobs are not an error; anything else is.
    pub async fn delete(&self, blob_id: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path(blob_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Blob {blob_id} already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
