//! Odyssey - interactive hero's journey stories
//!
//! Odyssey tells a branching story about a hero the reader creates. Each turn
//! a hosted language model writes the next scenario with a few choices, an
//! image model illustrates it, and the story advances through the twelve
//! stages of the hero's journey.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use odyssey::{CharacterProfile, JourneySession, OdysseyConfig, OpenAIClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OdysseyConfig::load()?;
//!     let client = OpenAIClient::new(config.openai_config()?)?;
//!
//!     let hero = CharacterProfile::builder()
//!         .name("Pip")
//!         .creature("hedgehog")
//!         .distinguishing_feature("a lantern tail")
//!         .challenge("Overcoming fear")
//!         .goal("cross the dark forest")
//!         .build()?;
//!
//!     let settings = config.session_settings(None, None, true)?;
//!     let mut session =
//!         JourneySession::new(hero, settings, config.tracker()?, client.clone(), client)?;
//!
//!     let opening = session.begin().await?;
//!     println!("{}", opening.scenario().narrative());
//!     let next = session.choose(0).await?;
//!     println!("{}", next.scenario().narrative());
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `api` - Enable tests that call the hosted models
//!
//! # Architecture
//!
//! - `odyssey-error` - Error types
//! - `odyssey-core` - Shared data types (profile, requests, events)
//! - `odyssey-interface` - Generator and session store traits
//! - `odyssey-cache` - Single-flight scenario cache
//! - `odyssey-storage` - Session snapshots and content-addressed images
//! - `odyssey-models` - OpenAI client
//! - `odyssey-narrative` - Stage tracking, parsing, prompts and sessions
//!
//! This crate (`odyssey`) re-exports everything and adds layered configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;

pub use config::{JourneySection, OdysseyConfig, ProviderSection, StorageSection};

// Re-export the workspace crates
pub use odyssey_cache::{
    CacheStats, ScenarioCache, ScenarioCacheConfig, ScenarioCacheConfigBuilder, Signature,
};
pub use odyssey_core::*;
pub use odyssey_error::*;
pub use odyssey_interface::*;
pub use odyssey_models::{OpenAIClient, OpenAIConfig, OpenAIConfigBuilder};
pub use odyssey_narrative::{
    DelimiterConvention, HERO_JOURNEY_STAGES, JourneySession, MarkdownExporter, ParseOutcome,
    ParserConfig, ParserConfigBuilder, PendingTurn, PromptBuilder, ResponseParser,
    SNAPSHOT_VERSION, SessionSettings, SessionSettingsBuilder, SessionSnapshot, StageTracker,
    StoryLog, TurnReport,
};
pub use odyssey_storage::{
    FileSystemImageStorage, FileSystemSessionStore, ImageStorage, StoredImage,
};
