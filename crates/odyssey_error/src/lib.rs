//! Error types for the Odyssey story engine.
//!
//! This crate provides the error types shared by every Odyssey crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! Everything converts into [`OdysseyError`], so `?` works across crate seams.
//!
//! # Examples
//!
//! ```
//! use odyssey_error::{GenerationError, GenerationErrorKind, OdysseyResult};
//!
//! fn ask_model() -> OdysseyResult<String> {
//!     Err(GenerationError::new(GenerationErrorKind::EmptyResponse))?
//! }
//!
//! match ask_model() {
//!     Ok(text) => println!("Got: {}", text),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod generation;
mod json;
mod narrative;
mod storage;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::ConfigError;
pub use error::{OdysseyError, OdysseyErrorKind, OdysseyResult};
pub use generation::{GenerationError, GenerationErrorKind, RetryableError};
pub use json::JsonError;
pub use narrative::{NarrativeError, NarrativeErrorKind};
pub use storage::{StorageError, StorageErrorKind};
