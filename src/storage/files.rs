//! Local disk file store
//!
//! Provides file system operations with proper error handling and validation.

use super::{FileStore, FileStoreError};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Length of the hex stem of generated file names
const HASH_NAME_LEN: usize = 40;

/// Generate a collision-resistant file name for an upload
///
/// The stem is a SHA-256 digest over a random per-upload nonce followed by the
/// file content, so two uploads never share a name even when their bytes match.
///
/// # Arguments
/// * `bytes` - File content
/// * `extension` - Extension without the dot (e.g. `png`)
pub fn hash_name(bytes: &[u8], extension: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(uuid::Uuid::new_v4().as_bytes());
    hasher.update(bytes);
    let digest = hex::encode(hasher.finalize());
    let stem: String = digest.chars().take(HASH_NAME_LEN).collect();
    format!("{stem}.{extension}")
}

/// A single plain path segment: no separators, no `.`/`..`, not empty
fn is_plain_segment(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !segment.contains(['/', '\\'])
}

/// Files stored under a root directory, one subdirectory per namespace
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Create a store rooted at `root` (created lazily on first write)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate a namespace/name pair and build its path under the root
    ///
    /// # Returns
    /// * `Ok(PathBuf)` - Path of the file
    /// * `Err(FileStoreError)` - If either part would escape the root
    pub fn resolve(&self, namespace: &str, name: &str) -> Result<PathBuf, FileStoreError> {
        let mut path = self.root.clone();
        for segment in namespace.split('/').filter(|s| !s.is_empty()) {
            if !is_plain_segment(segment) {
                return Err(FileStoreError::InvalidName(format!(
                    "Invalid namespace: {}",
                    namespace
                )));
            }
            path.push(segment);
        }
        if !is_plain_segment(name) {
            return Err(FileStoreError::InvalidName(name.to_string()));
        }
        path.push(name);
        Ok(path)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put(&self, namespace: &str, name: &str, bytes: &[u8]) -> Result<(), FileStoreError> {
        let path = self.resolve(namespace, name)?;
        let io_error = |source| FileStoreError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(io_error)?;
        }

        let mut file = fs::File::create(&path).await.map_err(io_error)?;
        file.write_all(bytes).await.map_err(io_error)?;
        file.sync_all().await.map_err(io_error)?;

        debug!("Stored file {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), FileStoreError> {
        if name.is_empty() {
            warn!("Skipping delete of empty file name in {}", namespace);
            return Ok(());
        }
        let path = self.resolve(namespace, name)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted file {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("File already absent: {}", path.display());
                Ok(())
            }
            Err(source) => Err(FileStoreError::Io { path, source }),
        }
    }

    async fn exists(&self, namespace: &str, name: &str) -> Result<bool, FileStoreError> {
        let path = self.resolve(namespace, name)?;
        fs::try_exists(&path)
            .await
            .map_err(|source| FileStoreError::Io { path, source })
    }
}
