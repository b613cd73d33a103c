//! Local persistence for Odyssey.
//!
//! Two stores live here:
//!
//! - [`FileSystemImageStorage`] keeps illustration bytes in a
//!   content-addressed tree so identical images are written once.
//! - [`FileSystemSessionStore`] keeps one JSON snapshot per session so a
//!   journey can be resumed later.
//!
//! # Example
//!
//! ```rust
//! use odyssey_core::ImageHandle;
//! use odyssey_storage::{FileSystemImageStorage, ImageStorage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = FileSystemImageStorage::new("/tmp/odyssey-media")?;
//! let image = ImageHandle::new(vec![0u8; 16], "image/png", "Pip at the forest edge");
//!
//! let stored = storage.store(&image).await?;
//! assert_eq!(storage.retrieve(&stored).await?, image.data().to_vec());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use derive_getters::Getters;
use odyssey_core::ImageHandle;
use odyssey_error::OdysseyResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod filesystem;
mod session_store;

pub use filesystem::FileSystemImageStorage;
pub use odyssey_error::{StorageError, StorageErrorKind};
pub use session_store::FileSystemSessionStore;

/// Where an image ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct StoredImage {
    /// SHA-256 hex digest of the bytes
    content_hash: String,
    /// Location on disk
    path: PathBuf,
    /// MIME type
    mime: String,
    /// Size in bytes
    size_bytes: u64,
}

/// Backend for illustration bytes.
#[async_trait::async_trait]
pub trait ImageStorage: Send + Sync {
    /// Store the image, returning where it lives. Storing the same bytes
    /// twice yields the same location.
    async fn store(&self, image: &ImageHandle) -> OdysseyResult<StoredImage>;

    /// Read the bytes back, checking them against the recorded hash.
    async fn retrieve(&self, stored: &StoredImage) -> OdysseyResult<Vec<u8>>;

    /// True when these exact bytes are already stored.
    async fn exists(&self, image: &ImageHandle) -> OdysseyResult<bool>;
}
