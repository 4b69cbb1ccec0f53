use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::storage::{PhotoStore, RemoveOutcome, StorageError};

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Photo store backed by a directory that is also served statically.
#[derive(Debug, Clone)]
pub struct DiskPhotoStore {
    root: PathBuf,
    public_prefix: String,
    max_file_bytes: usize,
}

impl DiskPhotoStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            root: PathBuf::from(&config.dir),
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
            max_file_bytes: config.max_file_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the uploads directory if it does not exist yet.
    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Pick the stored extension: the original one when it is on the
    /// allow-list, `.jpg` when the name has none, rejection otherwise.
    fn accepted_extension(original_name: &str) -> Result<String, StorageError> {
        match Path::new(original_name).extension().and_then(|e| e.to_str()) {
            None => Ok(".jpg".to_string()),
            Some(ext) => {
                let ext = ext.to_ascii_lowercase();
                if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
                    Ok(format!(".{}", ext))
                } else {
                    Err(StorageError::UnsupportedType(original_name.to_string()))
                }
            }
        }
    }

    /// Resolve a public reference back to a path inside the store root.
    /// References that are not a plain file name under the public prefix do
    /// not resolve.
    fn file_path(&self, reference: &str) -> Option<PathBuf> {
        let name = reference.strip_prefix(&self.public_prefix)?.strip_prefix('/')?;
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return None;
        }
        Some(self.root.join(name))
    }
}

#[async_trait]
impl PhotoStore for DiskPhotoStore {
    async fn save(&self, bytes: &[u8], original_name: &str) -> Result<String, StorageError> {
        if bytes.len() > self.max_file_bytes {
            return Err(StorageError::TooLarge {
                size: bytes.len(),
                max_bytes: self.max_file_bytes,
            });
        }

        let ext = Self::accepted_extension(original_name)?;
        let file_name = format!("prop_{}{}", Uuid::new_v4(), ext);
        tokio::fs::write(self.root.join(&file_name), bytes).await?;

        Ok(format!("{}/{}", self.public_prefix, file_name))
    }

    async fn remove(&self, reference: &str) -> RemoveOutcome {
        let Some(path) = self.file_path(reference) else {
            return RemoveOutcome::Failed(format!(
                "reference does not resolve inside the photo store: {}",
                reference
            ));
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => RemoveOutcome::Removed,
            Err(e) if e.kind() == ErrorKind::NotFound => RemoveOutcome::Missing,
            Err(e) => RemoveOutcome::Failed(e.to_string()),
        }
    }
}
