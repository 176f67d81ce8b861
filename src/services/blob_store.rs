use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::{BlobKind, OutputFormat};

/// Named byte storage, one area per [`BlobKind`].
///
/// Nothing is ever deleted.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn save(&self, kind: BlobKind, name: &str, bytes: Vec<u8>) -> Result<(), StoreError>;

    async fn load(&self, kind: BlobKind, name: &str) -> Result<Vec<u8>, StoreError>;

    async fn exists(&self, kind: BlobKind, name: &str) -> Result<bool, StoreError>;
}

fn unsafe_chars() -> &'static Regex {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]+").expect("static pattern"))
}

fn valid_name() -> &'static Regex {
    static VALID: OnceLock<Regex> = OnceLock::new();
    VALID.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("static pattern"))
}

/// Reduce a client-supplied file name to a safe single path component.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned = unsafe_chars().replace_all(base.trim(), "_");
    let mut cleaned = cleaned.trim_start_matches(['.', '_']).to_string();
    while cleaned.contains("..") {
        cleaned = cleaned.replace("..", ".");
    }
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

/// Unique stored name for an upload: random hex prefix plus the sanitized name.
pub fn upload_name(original: &str) -> String {
    let id: [u8; 16] = rand::random();
    format!("{}_{}", hex::encode(id), sanitize_file_name(original))
}

/// Stored name for a result derived from `source`.
pub fn result_name(source: &str, kind: BlobKind, format: OutputFormat) -> String {
    let stem = source.rsplit_once('.').map_or(source, |(stem, _)| stem);
    format!("{stem}_{kind}.{}", format.extension())
}

/// Reject names that could escape the kind's area.
pub fn validate_name(name: &str) -> Result<&str, StoreError> {
    if name.contains("..") || !valid_name().is_match(name) {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(name)
}

/// Blobs as files under `<root>/<kind>/<name>`.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Create the per-kind directories.
    pub async fn ensure_dirs(&self) -> Result<(), StoreError> {
        for kind in [BlobKind::Uploads, BlobKind::Enhanced, BlobKind::Outlined] {
            tokio::fs::create_dir_all(self.root.join(kind.as_str())).await?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, kind: BlobKind, name: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join(kind.as_str()).join(validate_name(name)?))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn save(&self, kind: BlobKind, name: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let path = self.path_for(kind, name)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        tracing::debug!(%kind, name, size = bytes.len(), "Stored blob");
        Ok(())
    }

    async fn load(&self, kind: BlobKind, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(kind, name)?;
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(name.to_string())
            } else {
                tracing::warn!(%kind, name, error = %e, "Failed to read blob");
                StoreError::Io(e)
            }
        })
    }

    async fn exists(&self, kind: BlobKind, name: &str) -> Result<bool, StoreError> {
        let path = self.path_for(kind, name)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}

/// Blobs kept in memory, for tests and one-shot CLI runs.
pub struct InMemoryBlobStore {
    blobs: Arc<RwLock<HashMap<(BlobKind, String), Vec<u8>>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn save(&self, kind: BlobKind, name: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let name = validate_name(name)?;
        let mut blobs = self.blobs.write().await;
        blobs.insert((kind, name.to_string()), bytes);
        Ok(())
    }

    async fn load(&self, kind: BlobKind, name: &str) -> Result<Vec<u8>, StoreError> {
        let name = validate_name(name)?;
        let blobs = self.blobs.read().await;
        blobs
            .get(&(kind, name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn exists(&self, kind: BlobKind, name: &str) -> Result<bool, StoreError> {
        let name = validate_name(name)?;
        let blobs = self.blobs.read().await;
        Ok(blobs.contains_key(&(kind, name.to_string())))
    }
}
