//! Content-addressed image files.

use crate::{ImageStorage, StoredImage};
use odyssey_core::ImageHandle;
use odyssey_error::{OdysseyResult, StorageError, StorageErrorKind};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Filesystem image store.
///
/// Files live at `{base_path}/images/{hash[0:2]}/{hash[2:4]}/{hash}.{ext}`:
///
/// ```text
/// media/
/// └── images/
///     └── ab/
///         └── cd/
///             └── abcdef123456....png
/// ```
///
/// Writes go to a temp file that is renamed into place, so a crash never
/// leaves a half-written image under its final name.
#[derive(Debug, Clone)]
pub struct FileSystemImageStorage {
    base_path: PathBuf,
}

impl FileSystemImageStorage {
    /// Open (and create if needed) a store rooted at `base_path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::DirectoryCreation`] if the directory cannot
    /// be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> OdysseyResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Opened image storage");
        Ok(Self { base_path })
    }

    /// Root directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn compute_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }

    fn path_for(&self, hash: &str, extension: &str) -> PathBuf {
        self.base_path
            .join("images")
            .join(&hash[0..2])
            .join(&hash[2..4])
            .join(format!("{}.{}", hash, extension))
    }

    fn verify_hash(data: &[u8], expected: &str) -> OdysseyResult<()> {
        let actual = Self::compute_hash(data);
        if actual != expected {
            return Err(StorageError::new(StorageErrorKind::HashMismatch {
                expected: expected.to_string(),
                actual,
            })
            .into());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ImageStorage for FileSystemImageStorage {
    #[tracing::instrument(skip(self, image), fields(size = image.data().len(), mime = %image.mime()))]
    async fn store(&self, image: &ImageHandle) -> OdysseyResult<StoredImage> {
        let hash = Self::compute_hash(image.data());
        let path = self.path_for(&hash, image.extension());
        let stored = StoredImage {
            content_hash: hash.clone(),
            path: path.clone(),
            mime: image.mime().clone(),
            size_bytes: image.data().len() as u64,
        };

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(hash = %hash, path = %path.display(), "Image already stored");
            return Ok(stored);
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, image.data()).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;
        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::info!(hash = %hash, path = %path.display(), "Stored image");
        Ok(stored)
    }

    #[tracing::instrument(skip(self, stored), fields(hash = %stored.content_hash))]
    async fn retrieve(&self, stored: &StoredImage) -> OdysseyResult<Vec<u8>> {
        let data = tokio::fs::read(&stored.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(stored.path.display().to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    stored.path.display(),
                    e
                )))
            }
        })?;

        Self::verify_hash(&data, &stored.content_hash)?;
        tracing::debug!(size = data.len(), "Retrieved image");
        Ok(data)
    }

    async fn exists(&self, image: &ImageHandle) -> OdysseyResult<bool> {
        let path = self.path_for(&Self::compute_hash(image.data()), image.extension());
        Ok(tokio::fs::try_exists(&path).await.unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_layout_uses_hash_prefixes() {
        let storage = FileSystemImageStorage {
            base_path: PathBuf::from("/media"),
        };
        let hash = FileSystemImageStorage::compute_hash(b"pixels");
        let path = storage.path_for(&hash, "png");
        let expected = PathBuf::from("/media/images")
            .join(&hash[0..2])
            .join(&hash[2..4])
            .join(format!("{}.png", hash));
        assert_eq!(path, expected);
    }

    #[test]
    fn verify_hash_reports_both_digests() {
        let err = FileSystemImageStorage::verify_hash(b"tampered", "00ff").unwrap_err();
        assert!(err.to_string().contains("expected 00ff"));
    }
}
