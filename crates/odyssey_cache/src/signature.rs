//! Bounded cache keys.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const PART_SEPARATOR: u8 = 0x1f;

/// Stable, fixed-size key derived from the salient inputs of a call.
///
/// Always 64 lowercase hex characters, however long the inputs are.
///
/// # Examples
///
/// ```
/// use odyssey_cache::Signature;
///
/// let a = Signature::from_parts(["scenario", "Pip the hedgehog", "The Ordeal", "Jump"]);
/// let b = Signature::from_parts(["scenario", "Pip the hedgehog", "The Ordeal", "Jump"]);
/// assert_eq!(a, b);
/// assert_eq!(a.as_str().len(), 64);
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// Hash the parts in order. Parts are separated so that
    /// `["ab", "c"]` and `["a", "bc"]` produce different signatures.
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut hasher = Sha256::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                hasher.update([PART_SEPARATOR]);
            }
            hasher.update(part.as_ref().as_bytes());
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight hex characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}
