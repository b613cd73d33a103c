//! A model completion split into narrative and choices.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Choices offered when a completion carried none.
pub const FALLBACK_CHOICES: [&str; 3] = ["Retry", "Continue cautiously", "End journey"];

/// What a fallback choice asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum FallbackChoice {
    /// Tell the current scenario again, changing nothing else
    #[strum(serialize = "Retry")]
    Retry,
    /// An ordinary continuation
    #[strum(serialize = "Continue cautiously")]
    ContinueCautiously,
    /// Stop the journey where it is
    #[strum(serialize = "End journey")]
    EndJourney,
}

impl FallbackChoice {
    /// Every fallback choice, in [`FALLBACK_CHOICES`] order.
    pub const ALL: [FallbackChoice; 3] = [
        FallbackChoice::Retry,
        FallbackChoice::ContinueCautiously,
        FallbackChoice::EndJourney,
    ];
}

/// Narrative text plus the options the player can pick from.
///
/// # Examples
///
/// ```
/// use odyssey_core::{ParsedScenario, FALLBACK_CHOICES};
///
/// let scenario = ParsedScenario::new("The bridge is out.", vec![]).with_fallback();
/// assert_eq!(scenario.choices().len(), FALLBACK_CHOICES.len());
/// assert!(scenario.uses_fallback());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ParsedScenario {
    /// Scenario text
    narrative: String,
    /// Options in display order
    choices: Vec<String>,
}

impl ParsedScenario {
    /// Create a scenario.
    pub fn new(narrative: impl Into<String>, choices: Vec<String>) -> Self {
        Self {
            narrative: narrative.into(),
            choices,
        }
    }

    /// Substitute [`FALLBACK_CHOICES`] when no choices were parsed.
    pub fn with_fallback(mut self) -> Self {
        if self.choices.is_empty() {
            self.choices = FALLBACK_CHOICES.iter().map(|c| c.to_string()).collect();
        }
        self
    }

    /// True when the offered choices are exactly the fallback set.
    pub fn uses_fallback(&self) -> bool {
        self.choices.len() == FALLBACK_CHOICES.len()
            && self.choices.iter().zip(FALLBACK_CHOICES).all(|(a, b)| a == b)
    }

    /// The fallback action at `index`, when the fallback set is on offer.
    pub fn fallback_choice(&self, index: usize) -> Option<FallbackChoice> {
        if !self.uses_fallback() {
            return None;
        }
        FallbackChoice::ALL.get(index).copied()
    }

    /// Choice at `index`, if offered.
    pub fn choice(&self, index: usize) -> Option<&str> {
        self.choices.get(index).map(String::as_str)
    }
}
