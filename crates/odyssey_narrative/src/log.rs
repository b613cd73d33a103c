//! Append-only story history.

use odyssey_core::{StoryEvent, StoryEventKind};
use serde::{Deserialize, Serialize};

/// Ordered record of everything that happened in a journey.
///
/// Events are never removed or reordered. Starting over means replacing the
/// log with a fresh one.
///
/// # Examples
///
/// ```
/// use odyssey_core::StoryEvent;
/// use odyssey_narrative::StoryLog;
///
/// let mut log = StoryLog::new();
/// log.append(StoryEvent::scenario(0, "Pip wakes."));
/// log.append(StoryEvent::choice(0, "Stretch"));
///
/// assert_eq!(log.len(), 2);
/// assert_eq!(log.tail(1)[0], StoryEvent::choice(0, "Stretch"));
/// assert_eq!(log.last_scenario(), Some("Pip wakes."));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryLog {
    events: Vec<StoryEvent>,
}

impl StoryLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event at the end.
    pub fn append(&mut self, event: StoryEvent) {
        tracing::debug!(
            kind = event.kind().label(),
            stage_index = *event.stage_index(),
            position = self.events.len(),
            "Appending story event"
        );
        self.events.push(event);
    }

    /// The last `n` events in order (fewer if the log is shorter).
    pub fn tail(&self, n: usize) -> &[StoryEvent] {
        let start = self.events.len().saturating_sub(n);
        &self.events[start..]
    }

    /// Every event in order.
    pub fn all(&self) -> &[StoryEvent] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing has happened yet.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate events in order.
    pub fn iter(&self) -> impl Iterator<Item = &StoryEvent> {
        self.events.iter()
    }

    /// Text of the most recent scenario.
    pub fn last_scenario(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|event| match event.kind() {
            StoryEventKind::Scenario(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Text of the most recent choice.
    pub fn last_choice(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|event| match event.kind() {
            StoryEventKind::Choice(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Number of scenarios shown so far, i.e. completed turns.
    pub fn turn_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event.kind(), StoryEventKind::Scenario(_)))
            .count()
    }

    /// Narrative text of the last `n` scenarios, oldest first.
    pub fn scenario_texts_tail(&self, n: usize) -> Vec<&str> {
        let mut texts: Vec<&str> = self
            .events
            .iter()
            .rev()
            .filter_map(|event| match event.kind() {
                StoryEventKind::Scenario(text) => Some(text.as_str()),
                _ => None,
            })
            .take(n)
            .collect();
        texts.reverse();
        texts
    }

    /// The last `n` events that carry prompt context (scenarios and choices).
    pub fn context_tail(&self, n: usize) -> Vec<StoryEvent> {
        let mut context: Vec<StoryEvent> = self
            .events
            .iter()
            .rev()
            .filter(|event| {
                matches!(
                    event.kind(),
                    StoryEventKind::Scenario(_) | StoryEventKind::Choice(_)
                )
            })
            .take(n)
            .cloned()
            .collect();
        context.reverse();
        context
    }
}

impl<'a> IntoIterator for &'a StoryLog {
    type Item = &'a StoryEvent;
    type IntoIter = std::slice::Iter<'a, StoryEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
