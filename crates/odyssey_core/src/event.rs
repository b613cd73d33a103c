//! Entries of the story history.

use crate::ImageHandle;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum StoryEventKind {
    /// Narrative text shown to the player
    Scenario(String),
    /// The option the player picked
    Choice(String),
    /// Feedback on the player's pick
    Outcome(String),
    /// Illustration of the preceding scenario
    Image(ImageHandle),
    /// A visible, non-fatal failure
    Error(String),
}

impl StoryEventKind {
    /// Short lowercase label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            StoryEventKind::Scenario(_) => "scenario",
            StoryEventKind::Choice(_) => "choice",
            StoryEventKind::Outcome(_) => "outcome",
            StoryEventKind::Image(_) => "image",
            StoryEventKind::Error(_) => "error",
        }
    }

    /// Text payload, if this kind carries text.
    pub fn text(&self) -> Option<&str> {
        match self {
            StoryEventKind::Scenario(text)
            | StoryEventKind::Choice(text)
            | StoryEventKind::Outcome(text)
            | StoryEventKind::Error(text) => Some(text),
            StoryEventKind::Image(_) => None,
        }
    }
}

/// One entry in the story, stamped with the stage it happened in.
///
/// # Examples
///
/// ```
/// use odyssey_core::{StoryEvent, StoryEventKind};
///
/// let event = StoryEvent::scenario(0, "Pip wakes in the burrow.");
/// assert_eq!(*event.stage_index(), 0);
/// assert_eq!(event.kind().text(), Some("Pip wakes in the burrow."));
/// assert!(matches!(event.kind(), StoryEventKind::Scenario(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct StoryEvent {
    /// Stage index current when the event was recorded
    stage_index: usize,
    /// Event payload
    kind: StoryEventKind,
}

impl StoryEvent {
    /// Create an event.
    pub fn new(stage_index: usize, kind: StoryEventKind) -> Self {
        Self { stage_index, kind }
    }

    /// Scenario event.
    pub fn scenario(stage_index: usize, text: impl Into<String>) -> Self {
        Self::new(stage_index, StoryEventKind::Scenario(text.into()))
    }

    /// Choice event.
    pub fn choice(stage_index: usize, text: impl Into<String>) -> Self {
        Self::new(stage_index, StoryEventKind::Choice(text.into()))
    }

    /// Outcome event.
    pub fn outcome(stage_index: usize, text: impl Into<String>) -> Self {
        Self::new(stage_index, StoryEventKind::Outcome(text.into()))
    }

    /// Image event.
    pub fn image(stage_index: usize, image: ImageHandle) -> Self {
        Self::new(stage_index, StoryEventKind::Image(image))
    }

    /// Error event.
    pub fn error(stage_index: usize, text: impl Into<String>) -> Self {
        Self::new(stage_index, StoryEventKind::Error(text.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_kind_tag() {
        let event = StoryEvent::choice(3, "Follow the river");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"]["type"], "choice");
        assert_eq!(json["kind"]["payload"], "Follow the river");
        assert_eq!(json["stage_index"], 3);

        let back: StoryEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
