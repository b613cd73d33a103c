//! Collaborator traits for the Odyssey story engine.
//!
//! The journey pipeline talks to hosted models and persistence only through
//! these traits, so tests can substitute scripted implementations.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{ImageGenerator, SessionStore, TextGenerator};
