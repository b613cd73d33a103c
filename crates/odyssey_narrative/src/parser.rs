//! Splits a loosely structured completion into narrative and choices.
//!
//! Model output is expected to look like
//!
//! ```text
//! Scenario description
//!
//! 1. First choice
//! 2. Second choice
//! 3. Third choice
//! ```
//!
//! but the parser never rejects a completion for missing that shape. It
//! degrades instead: short choice lists are padded, long ones truncated, and
//! a completion with no choices at all is returned with an empty list so the
//! caller can offer the fallback set.

use derive_builder::Builder;
use derive_getters::Getters;
use odyssey_core::ParsedScenario;
use odyssey_error::{BuilderError, ConfigError, OdysseyResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Where the narrative ends and the choice list begins.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DelimiterConvention {
    /// First blank line
    #[default]
    BlankLine,
    /// First line starting with `1.` or `1)`
    Marker,
    /// The marker when present, otherwise the first blank line
    MarkerOrBlankLine,
}

fn default_choice_count() -> usize {
    3
}

fn default_placeholder_prefix() -> String {
    "Option".to_string()
}

/// Parser settings.
///
/// # Examples
///
/// ```
/// use odyssey_narrative::{DelimiterConvention, ParserConfig};
///
/// let config = ParserConfig::builder()
///     .choice_count(2usize)
///     .strip_markers(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(*config.choice_count(), 2);
/// assert_eq!(*config.delimiter(), DelimiterConvention::BlankLine);
/// assert!(ParserConfig::builder().choice_count(0usize).build().is_err());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    Builder,
)]
#[setters(prefix = "with_")]
#[builder(build_fn(validate = "Self::validate", error = "BuilderError"))]
pub struct ParserConfig {
    /// Number of choices every parsed scenario should carry
    #[serde(default = "default_choice_count")]
    #[builder(default = "default_choice_count()")]
    choice_count: usize,

    /// Narrative/choices split rule
    #[serde(default)]
    #[builder(default)]
    delimiter: DelimiterConvention,

    /// Remove leading `1.`, `2)`, `-`, `*` markers from choices
    #[serde(default)]
    #[builder(default)]
    strip_markers: bool,

    /// Label for synthesized choices ("Option 3")
    #[serde(default = "default_placeholder_prefix")]
    #[builder(default = "default_placeholder_prefix()", setter(into))]
    placeholder_prefix: String,
}

impl ParserConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.choice_count == Some(0) {
            return Err("choice_count must be at least 1".to_string());
        }
        Ok(())
    }
}

impl ParserConfig {
    /// Start building a config.
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::default()
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            choice_count: default_choice_count(),
            delimiter: DelimiterConvention::default(),
            strip_markers: false,
            placeholder_prefix: default_placeholder_prefix(),
        }
    }
}

/// Result of parsing one completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Narrative found; choices may be empty when no delimiter was present
    Parsed(ParsedScenario),
    /// Nothing but whitespace before the delimiter
    EmptyNarrative,
}

impl ParseOutcome {
    /// The scenario, if one was parsed.
    pub fn into_scenario(self) -> Option<ParsedScenario> {
        match self {
            ParseOutcome::Parsed(scenario) => Some(scenario),
            ParseOutcome::EmptyNarrative => None,
        }
    }
}

/// Completion parser.
///
/// # Examples
///
/// ```
/// use odyssey_narrative::{ParseOutcome, ParserConfig, ResponseParser};
///
/// let parser = ResponseParser::new(ParserConfig::default()).unwrap();
/// let ParseOutcome::Parsed(scenario) = parser.parse("Narrative here.\n\n1. A\n2. B\n3. C") else {
///     panic!("expected a scenario");
/// };
/// assert_eq!(scenario.narrative(), "Narrative here.");
/// assert_eq!(scenario.choices(), &["1. A", "2. B", "3. C"]);
/// ```
#[derive(Debug, Clone)]
pub struct ResponseParser {
    config: ParserConfig,
    blank_line: Regex,
    first_marker: Regex,
    any_marker: Regex,
}

impl ResponseParser {
    /// Create a parser.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the built-in patterns fail to compile.
    pub fn new(config: ParserConfig) -> OdysseyResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| ConfigError::new(format!("Invalid parser pattern: {}", e)))
        };
        Ok(Self {
            config,
            blank_line: compile(r"\n[ \t]*\n")?,
            first_marker: compile(r"(?m)^[ \t]*1[.)]")?,
            any_marker: compile(r"^(?:\d+[.)]\s*|[-*•]\s+)")?,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Split `text` into narrative and exactly `choice_count` choices, or
    /// none when no delimiter is found.
    #[tracing::instrument(skip(self, text), fields(len = text.len(), delimiter = %self.config.delimiter))]
    pub fn parse(&self, text: &str) -> ParseOutcome {
        let text = text.replace("\r\n", "\n");
        let (narrative, rest) = self.split(&text);

        let narrative = narrative.trim();
        if narrative.is_empty() {
            warn!("Completion has no narrative text");
            return ParseOutcome::EmptyNarrative;
        }

        let Some(rest) = rest else {
            debug!("No delimiter found, returning narrative without choices");
            return ParseOutcome::Parsed(ParsedScenario::new(narrative, Vec::new()));
        };

        let mut choices: Vec<String> = rest
            .lines()
            .map(|line| self.clean_choice(line))
            .filter(|line| !line.is_empty())
            .take(self.config.choice_count)
            .collect();

        if choices.is_empty() {
            debug!("Delimiter found but no choice lines followed");
            return ParseOutcome::Parsed(ParsedScenario::new(narrative, choices));
        }

        if choices.len() < self.config.choice_count {
            warn!(
                found = choices.len(),
                expected = self.config.choice_count,
                "Padding choice list with placeholders"
            );
            for position in choices.len() + 1..=self.config.choice_count {
                choices.push(format!("{} {}", self.config.placeholder_prefix, position));
            }
        }

        ParseOutcome::Parsed(ParsedScenario::new(narrative, choices))
    }

    fn split<'a>(&self, text: &'a str) -> (&'a str, Option<&'a str>) {
        match self.config.delimiter {
            DelimiterConvention::BlankLine => self.split_blank_line(text),
            DelimiterConvention::Marker => self.split_marker(text),
            DelimiterConvention::MarkerOrBlankLine => match self.split_marker(text) {
                (narrative, Some(rest)) => (narrative, Some(rest)),
                _ => self.split_blank_line(text),
            },
        }
    }

    fn split_blank_line<'a>(&self, text: &'a str) -> (&'a str, Option<&'a str>) {
        let body = text.trim_start();
        match self.blank_line.find(body) {
            Some(m) => (&body[..m.start()], Some(&body[m.end()..])),
            None => (body, None),
        }
    }

    fn split_marker<'a>(&self, text: &'a str) -> (&'a str, Option<&'a str>) {
        match self.first_marker.find(text) {
            Some(m) => (&text[..m.start()], Some(&text[m.start()..])),
            None => (text, None),
        }
    }

    fn clean_choice(&self, line: &str) -> String {
        let line = line.trim();
        if self.config.strip_markers {
            self.any_marker.replace(line, "").trim().to_string()
        } else {
            line.to_string()
        }
    }
}
