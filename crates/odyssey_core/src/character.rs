//! The hero of the journey.

use derive_builder::Builder;
use derive_getters::Getters;
use odyssey_error::BuilderError;
use serde::{Deserialize, Serialize};

/// Challenge areas offered to players who want a suggestion.
pub const SUGGESTED_CHALLENGES: [&str; 4] = [
    "Overcoming fear",
    "Making new friends",
    "Learning a new skill",
    "Helping others",
];

/// Character profile entered by the player.
///
/// Every field must contain non-whitespace text.
///
/// # Examples
///
/// ```
/// use odyssey_core::CharacterProfile;
///
/// let hero = CharacterProfile::builder()
///     .name("Pip")
///     .creature("hedgehog")
///     .distinguishing_feature("a lantern tail")
///     .challenge("Overcoming fear")
///     .goal("cross the dark forest")
///     .build()
///     .unwrap();
///
/// assert_eq!(hero.identity(), "Pip the hedgehog");
/// assert!(CharacterProfile::builder().name("  ").build().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, Builder)]
#[builder(
    setter(into),
    build_fn(validate = "Self::validate", error = "BuilderError")
)]
pub struct CharacterProfile {
    /// Hero's name
    name: String,
    /// Kind of creature the hero is
    creature: String,
    /// Something that makes the hero stand out
    distinguishing_feature: String,
    /// What the hero struggles with
    challenge: String,
    /// What the hero wants to achieve
    goal: String,
}

impl CharacterProfileBuilder {
    fn validate(&self) -> Result<(), String> {
        let fields = [
            ("name", &self.name),
            ("creature", &self.creature),
            ("distinguishing_feature", &self.distinguishing_feature),
            ("challenge", &self.challenge),
            ("goal", &self.goal),
        ];
        for (field, value) in fields {
            if let Some(value) = value
                && value.trim().is_empty()
            {
                return Err(format!("{} cannot be blank", field));
            }
        }
        Ok(())
    }
}

impl CharacterProfile {
    /// Start building a profile.
    pub fn builder() -> CharacterProfileBuilder {
        CharacterProfileBuilder::default()
    }

    /// Short name used in prompts and cache signatures, e.g. "Pip the hedgehog".
    pub fn identity(&self) -> String {
        format!("{} the {}", self.name, self.creature)
    }

    /// Full description including the distinguishing feature.
    pub fn portrait(&self) -> String {
        format!(
            "{} the {} with {}",
            self.name, self.creature, self.distinguishing_feature
        )
    }
}
