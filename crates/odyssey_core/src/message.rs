//! Message types for conversation history.

use crate::Role;
use serde::{Deserialize, Serialize};

/// A single text message in a conversation with the text model.
///
/// # Examples
///
/// ```
/// use odyssey_core::{Message, Role};
///
/// let message = Message::user("Continue the story.");
/// assert_eq!(*message.role(), Role::User);
/// assert_eq!(message.content(), "Continue the story.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters)]
pub struct Message {
    /// The role of the message sender
    role: Role,
    /// Message text
    content: String,
}

impl Message {
    /// Create a message with an explicit role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// System instruction message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Player-side message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}
