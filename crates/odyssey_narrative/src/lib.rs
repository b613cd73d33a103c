//! Hero's journey engine for Odyssey.
//!
//! This crate turns model completions into an interactive story:
//!
//! - [`StageTracker`] moves the hero through an ordered list of stages.
//! - [`ResponseParser`] splits a completion into narrative and choices.
//! - [`PromptBuilder`] writes the prompts for scenarios and illustrations.
//! - [`StoryLog`] records every turn in order.
//! - [`JourneySession`] ties them together with a text and an image model.
//!
//! # Example
//!
//! ```rust,ignore
//! use odyssey_narrative::{JourneySession, SessionSettings, StageTracker};
//!
//! # async fn example(hero: odyssey_core::CharacterProfile, client: odyssey_models::OpenAIClient)
//! #     -> odyssey_error::OdysseyResult<()> {
//! let mut session = JourneySession::new(
//!     hero,
//!     SessionSettings::default(),
//!     StageTracker::hero_journey(),
//!     client.clone(),
//!     client,
//! )?;
//!
//! let opening = session.begin().await?;
//! println!("{}", opening.scenario().narrative());
//!
//! let next = session.choose(0).await?;
//! println!("Now in: {}", next.stage());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod export;
mod log;
mod parser;
mod prompt;
mod session;
mod settings;
mod snapshot;
mod stage;

pub use export::MarkdownExporter;
pub use log::StoryLog;
pub use parser::{
    DelimiterConvention, ParseOutcome, ParserConfig, ParserConfigBuilder, ResponseParser,
};
pub use prompt::PromptBuilder;
pub use session::{JourneySession, PendingTurn, TurnReport};
pub use settings::{SessionSettings, SessionSettingsBuilder};
pub use snapshot::{SNAPSHOT_VERSION, SessionSnapshot};
pub use stage::{HERO_JOURNEY_STAGES, StageTracker};
