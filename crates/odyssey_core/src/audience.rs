//! Who the story is told for and how it is illustrated.

use serde::{Deserialize, Serialize};

/// Vocabulary register the storyteller is asked to use.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Vocabulary {
    /// Short sentences and everyday words
    Simple,
    /// Plain, descriptive language
    Standard,
    /// Richer vocabulary and longer sentences
    Advanced,
}

impl Vocabulary {
    /// Style instruction appended to prompts.
    pub fn guidance(&self) -> &'static str {
        match self {
            Vocabulary::Simple => {
                "Use short sentences and simple, everyday words a young child can follow."
            }
            Vocabulary::Standard => "Use clear, descriptive language suitable for children.",
            Vocabulary::Advanced => {
                "Use rich vocabulary and vivid detail suitable for a confident teenage reader."
            }
        }
    }
}

/// Reader age band. Controls how many choices are offered and the vocabulary.
///
/// # Examples
///
/// ```
/// use odyssey_core::{AgeBand, Vocabulary};
///
/// let band: AgeBand = "young".parse().unwrap();
/// assert_eq!(band.choice_count(), 2);
/// assert_eq!(band.vocabulary(), Vocabulary::Simple);
/// assert_eq!(AgeBand::Teen.choice_count(), 3);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum AgeBand {
    /// Early readers
    Young,
    /// Middle grade
    Middle,
    /// Teenagers
    Teen,
}

impl AgeBand {
    /// Choices offered per turn when no band is set.
    pub const DEFAULT_CHOICE_COUNT: usize = 3;

    /// Choices offered per turn for this band.
    pub fn choice_count(&self) -> usize {
        match self {
            AgeBand::Young => 2,
            AgeBand::Middle | AgeBand::Teen => 3,
        }
    }

    /// Vocabulary register for this band.
    pub fn vocabulary(&self) -> Vocabulary {
        match self {
            AgeBand::Young => Vocabulary::Simple,
            AgeBand::Middle => Vocabulary::Standard,
            AgeBand::Teen => Vocabulary::Advanced,
        }
    }

    /// Choice count for an optional band.
    pub fn choice_count_for(band: Option<AgeBand>) -> usize {
        band.map_or(Self::DEFAULT_CHOICE_COUNT, |b| b.choice_count())
    }

    /// Vocabulary for an optional band.
    pub fn vocabulary_for(band: Option<AgeBand>) -> Vocabulary {
        band.map_or(Vocabulary::Standard, |b| b.vocabulary())
    }
}

/// Illustration style requested from the image model.
///
/// # Examples
///
/// ```
/// use odyssey_core::ArtStyle;
///
/// assert_eq!(ArtStyle::default().as_str(), "Digital painting");
/// assert_eq!(ArtStyle::from("Watercolor").to_string(), "Watercolor");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(transparent)]
pub struct ArtStyle(String);

impl ArtStyle {
    /// Style used when none is chosen.
    pub const DEFAULT: &'static str = "Digital painting";

    /// Create a style from free text.
    pub fn new(style: impl Into<String>) -> Self {
        Self(style.into())
    }

    /// Style text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ArtStyle {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl From<&str> for ArtStyle {
    fn from(style: &str) -> Self {
        Self::new(style)
    }
}

impl From<String> for ArtStyle {
    fn from(style: String) -> Self {
        Self(style)
    }
}
