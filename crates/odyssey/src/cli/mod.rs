//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the odyssey binary.

mod commands;
mod console;
mod export;
mod play;
mod sessions;

pub use commands::{Cli, Commands, PlayArgs};
pub use export::export_session;
pub use play::{play, resume};
pub use sessions::list_sessions;
