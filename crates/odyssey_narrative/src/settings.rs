//! Per-session knobs.

use crate::{DelimiterConvention, ParserConfig};
use derive_builder::Builder;
use derive_getters::Getters;
use odyssey_cache::ScenarioCacheConfig;
use odyssey_core::{AgeBand, ArtStyle, ImageSize};
use odyssey_error::BuilderError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_true() -> bool {
    true
}

fn default_history_window() -> usize {
    6
}

fn default_delimiter() -> DelimiterConvention {
    DelimiterConvention::MarkerOrBlankLine
}

/// How a journey is told, illustrated and bounded.
///
/// # Examples
///
/// ```
/// use odyssey_core::AgeBand;
/// use odyssey_narrative::SessionSettings;
///
/// let settings = SessionSettings::builder()
///     .age_band(Some(AgeBand::Young))
///     .call_timeout_secs(Some(30))
///     .build()
///     .unwrap();
///
/// assert_eq!(*settings.parser_config().choice_count(), 2);
/// assert!(*settings.illustrate());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    Builder,
)]
#[setters(prefix = "with_")]
#[builder(build_fn(error = "BuilderError"))]
pub struct SessionSettings {
    /// Reader age band; `None` uses three choices and standard vocabulary
    #[serde(default)]
    #[builder(default)]
    age_band: Option<AgeBand>,

    /// Illustration style; `None` leaves style out of scenario prompts and
    /// illustrates in [`ArtStyle::DEFAULT`]
    #[serde(default)]
    #[builder(default)]
    art_style: Option<ArtStyle>,

    /// Progress added per choice; `None` advances one stage per choice
    #[serde(default)]
    #[builder(default)]
    change_per_choice: Option<f64>,

    /// Narrative/choices split rule; defaults to splitting at the first
    /// numbered line so multi-paragraph scenarios stay whole
    #[serde(default = "default_delimiter")]
    #[builder(default = "default_delimiter()")]
    delimiter: DelimiterConvention,

    /// Strip enumeration markers from choices
    #[serde(default = "default_true")]
    #[builder(default = "true")]
    strip_markers: bool,

    /// Scenario/choice events replayed to the model as context
    #[serde(default = "default_history_window")]
    #[builder(default = "default_history_window()")]
    history_window: usize,

    /// Generate an image after every scenario
    #[serde(default = "default_true")]
    #[builder(default = "true")]
    illustrate: bool,

    /// Illustration resolution
    #[serde(default)]
    #[builder(default)]
    image_size: ImageSize,

    /// Upper bound on each model call
    #[serde(default)]
    #[builder(default)]
    call_timeout_secs: Option<u64>,

    /// Completion length cap for scenarios
    #[serde(default)]
    #[builder(default)]
    max_tokens: Option<u32>,

    /// Scenario and illustration cache settings
    #[serde(default)]
    #[builder(default)]
    cache: ScenarioCacheConfig,
}

impl SessionSettings {
    /// Start building settings.
    pub fn builder() -> SessionSettingsBuilder {
        SessionSettingsBuilder::default()
    }

    /// Parser configuration implied by these settings.
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig::default()
            .with_choice_count(AgeBand::choice_count_for(self.age_band))
            .with_delimiter(self.delimiter)
            .with_strip_markers(self.strip_markers)
    }

    /// Per-call deadline.
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            age_band: None,
            art_style: None,
            change_per_choice: None,
            delimiter: default_delimiter(),
            strip_markers: true,
            history_window: default_history_window(),
            illustrate: true,
            image_size: ImageSize::default(),
            call_timeout_secs: None,
            max_tokens: None,
            cache: ScenarioCacheConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_default_agree() {
        assert_eq!(SessionSettings::builder().build().unwrap(), SessionSettings::default());
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let settings: SessionSettings = serde_json::from_str(r#"{"age_band":"teen"}"#).unwrap();
        assert_eq!(*settings.age_band(), Some(AgeBand::Teen));
        assert!(*settings.strip_markers());
        assert_eq!(*settings.history_window(), 6);
        assert_eq!(*settings.delimiter(), DelimiterConvention::MarkerOrBlankLine);
    }
}
