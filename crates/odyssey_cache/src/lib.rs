//! Signature-keyed, single-flight memoization for expensive model calls.
//!
//! Identical (character, stage, choice, style) inputs map to the same
//! [`Signature`]; the first caller computes the value, concurrent callers
//! wait for it, and later callers get the stored copy.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod signature;

pub use cache::{CacheStats, ScenarioCache, ScenarioCacheConfig, ScenarioCacheConfigBuilder};
pub use signature::Signature;
