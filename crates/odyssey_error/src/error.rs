//! Top-level error wrapper types.

use crate::{
    BuilderError, ConfigError, GenerationError, JsonError, NarrativeError, StorageError,
};

/// Every error an Odyssey operation can produce.
///
/// # Examples
///
/// ```
/// use odyssey_error::{OdysseyError, StorageError, StorageErrorKind};
///
/// let storage_err = StorageError::new(StorageErrorKind::NotFound("abc".into()));
/// let err: OdysseyError = storage_err.into();
/// assert!(format!("{}", err).contains("Storage Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum OdysseyErrorKind {
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Text or image generation failed
    #[from(GenerationError)]
    Generation(GenerationError),
    /// Journey state error
    #[from(NarrativeError)]
    Narrative(NarrativeError),
    /// Session or image storage error
    #[from(StorageError)]
    Storage(StorageError),
}

/// Odyssey error with kind discrimination.
///
/// # Examples
///
/// ```
/// use odyssey_error::{OdysseyResult, ConfigError};
///
/// fn might_fail() -> OdysseyResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Odyssey Error: {}", _0)]
pub struct OdysseyError(Box<OdysseyErrorKind>);

impl OdysseyError {
    /// Create a new error from a kind.
    pub fn new(kind: OdysseyErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &OdysseyErrorKind {
        &self.0
    }

    /// True when the failure came from a text or image generation call.
    ///
    /// Generation failures never corrupt session state, so callers can offer a retry.
    pub fn is_generation_failure(&self) -> bool {
        matches!(self.kind(), OdysseyErrorKind::Generation(_))
    }
}

// Generic From implementation for any type that converts to OdysseyErrorKind
impl<T> From<T> for OdysseyError
where
    T: Into<OdysseyErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Odyssey operations.
pub type OdysseyResult<T> = std::result::Result<T, OdysseyError>;
