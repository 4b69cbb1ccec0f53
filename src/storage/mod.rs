pub mod disk;

use async_trait::async_trait;
use thiserror::Error;

pub use disk::DiskPhotoStore;

/// Errors from saving an uploaded photo.
///
/// Type and size rejections are client errors; anything else is an I/O
/// problem on the store side.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Only JPG/PNG/WEBP files allowed: {0}")]
    UnsupportedType(String),

    #[error("File exceeds the {max_bytes} byte limit")]
    TooLarge { size: usize, max_bytes: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// True when the error is the uploader's fault (maps to a 400).
    pub fn is_rejection(&self) -> bool {
        matches!(self, StorageError::UnsupportedType(_) | StorageError::TooLarge { .. })
    }
}

/// Outcome of a best-effort removal. `Failed` is information for logs and
/// tests, never a reason to abort the caller's operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    Missing,
    Failed(String),
}

impl RemoveOutcome {
    pub fn failure(&self) -> Option<&str> {
        match self {
            RemoveOutcome::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Persists uploaded photo payloads and resolves them to public references.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Persist one payload under a collision-resistant name and return the
    /// public reference that resolves to it.
    async fn save(&self, bytes: &[u8], original_name: &str) -> Result<String, StorageError>;

    /// Best-effort delete of the resource behind `reference`. A missing
    /// resource is not an error.
    async fn remove(&self, reference: &str) -> RemoveOutcome;
}
