//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Who authored a message sent to the text model.
///
/// Serializes with the lowercase names chat-completion APIs expect.
///
/// # Examples
///
/// ```
/// use odyssey_core::Role;
///
/// assert_eq!(Role::System.as_str(), "system");
/// assert_eq!(format!("{}", Role::Assistant), "Assistant");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Storyteller instructions
    System,
    /// The player side of the conversation
    User,
    /// Earlier model completions
    Assistant,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}
