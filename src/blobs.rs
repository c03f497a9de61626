//! Blob storage for meme images.
//!
//! Memes reference blobs by relative name; the public retrieval path is
//! derived at read time. Deletion is idempotent: a missing file is not an
//! error, so the reconciler can retry safely.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// URL prefix under which blobs are served to feed consumers.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Resolve a stored blob name to its public retrieval path.
pub fn public_url(blob_name: &str) -> String {
    format!("{}/{}", PUBLIC_PREFIX, blob_name)
}

/// Generate a fresh unique blob name, keeping the extension of the source
/// locator so the served file keeps a sensible content type. Locators with
/// no usable extension default to `.jpg`.
pub fn generate_blob_name(image_url: &str) -> String {
    let ext = Path::new(image_url)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 5 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("jpg");
    format!("{}.{}", Uuid::new_v4(), ext)
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist a blob under the given name.
    async fn write(&self, name: &str, data: &[u8]) -> Result<()>;

    /// Remove a blob. Idempotent: succeeds when the file is already gone.
    async fn delete(&self, name: &str) -> Result<()>;
}

/// Filesystem-backed blob store rooted at the uploads directory.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the store, ensuring the root directory exists.
    pub async fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("failed to create uploads dir {}", root.display()))?;
        Ok(Self { root })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn write(&self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(name);
        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("failed to write blob {}", path.display()))?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to delete blob {}", path.display())),
        }
    }
}
