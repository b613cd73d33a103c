//! Layered application configuration.

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use odyssey_cache::ScenarioCacheConfig;
use odyssey_core::{AgeBand, ArtStyle, ImageSize};
use odyssey_error::{BuilderError, ConfigError, OdysseyResult};
use odyssey_models::OpenAIConfig;
use odyssey_narrative::{SessionSettings, StageTracker};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Bundled defaults, compiled into the binary.
const DEFAULT_CONFIG: &str = include_str!("../odyssey.toml");

const ENV_PREFIX: &str = "ODYSSEY";

/// Hosted model settings (`[provider]`).
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
pub struct ProviderSection {
    /// API root
    base_url: String,
    /// Chat model for scenarios and image descriptions
    text_model: String,
    /// Image model for illustrations
    image_model: String,
    /// Illustration resolution
    #[serde(default)]
    image_size: ImageSize,
    /// Retry budget override for transient failures
    #[serde(default)]
    max_retries: Option<usize>,
    /// Per-request HTTP timeout
    timeout_secs: u64,
    /// Upper bound on each story turn's model call
    #[serde(default)]
    call_timeout_secs: Option<u64>,
}

/// Story shape (`[journey]`).
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
pub struct JourneySection {
    /// Ordered stage names
    stages: Vec<String>,
    /// Art style when the player does not pick one
    default_art_style: ArtStyle,
    /// Events replayed to the model as context
    history_window: usize,
    /// Progress added per choice
    #[serde(default)]
    change_per_choice: Option<f64>,
}

/// Where sessions and media live (`[storage]`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StorageSection {
    #[serde(default)]
    session_dir: Option<PathBuf>,
    #[serde(default)]
    media_dir: Option<PathBuf>,
}

impl StorageSection {
    /// Directory holding saved session snapshots.
    pub fn session_dir(&self) -> PathBuf {
        self.session_dir
            .clone()
            .unwrap_or_else(|| data_root().join("sessions"))
    }

    /// Directory holding illustrations saved during play.
    pub fn media_dir(&self) -> PathBuf {
        self.media_dir
            .clone()
            .unwrap_or_else(|| data_root().join("media"))
    }
}

fn data_root() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("odyssey"))
        .unwrap_or_else(|| PathBuf::from(".odyssey"))
}

/// Complete Odyssey configuration.
///
/// Sources, lowest precedence first:
/// 1. Bundled `odyssey.toml`
/// 2. `~/.config/odyssey/odyssey.toml`
/// 3. `./odyssey.toml`
/// 4. `ODYSSEY_<SECTION>__<KEY>` environment variables
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
pub struct OdysseyConfig {
    /// `[provider]`
    provider: ProviderSection,
    /// `[journey]`
    journey: JourneySection,
    /// `[cache]`
    #[serde(default)]
    cache: ScenarioCacheConfig,
    /// `[storage]`
    #[serde(default)]
    storage: StorageSection,
}

impl OdysseyConfig {
    /// Load from every source.
    #[tracing::instrument]
    pub fn load() -> OdysseyResult<Self> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".config/odyssey/odyssey.toml");
            tracing::debug!(path = %user_config.display(), "Checking user config");
            builder = builder.add_source(File::from(user_config).required(false));
        }

        let config = builder
            .add_source(File::with_name("odyssey").required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build config: {}", e)))?;

        Self::finish(config)
    }

    /// Bundled defaults overlaid with a single file.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> OdysseyResult<Self> {
        let config = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.to_path_buf()))
            .build()
            .map_err(|e| {
                ConfigError::new(format!("Failed to read {}: {}", path.display(), e))
            })?;

        Self::finish(config)
    }

    /// Bundled defaults only.
    pub fn bundled() -> OdysseyResult<Self> {
        let config = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to parse bundled config: {}", e)))?;

        Self::finish(config)
    }

    fn finish(config: Config) -> OdysseyResult<Self> {
        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to deserialize config: {}", e)))?;

        if loaded.journey.stages.is_empty() {
            return Err(
                ConfigError::for_key("journey.stages", "at least one stage is required").into(),
            );
        }
        if loaded
            .journey
            .change_per_choice
            .is_some_and(|c| !c.is_finite() || c <= 0.0)
        {
            return Err(ConfigError::for_key(
                "journey.change_per_choice",
                "must be a positive number",
            )
            .into());
        }

        tracing::info!(
            text_model = %loaded.provider.text_model,
            stages = loaded.journey.stages.len(),
            "Loaded configuration"
        );
        Ok(loaded)
    }

    /// Client settings for the configured provider.
    pub fn openai_config(&self) -> OdysseyResult<OpenAIConfig> {
        let provider = &self.provider;
        let config = OpenAIConfig::builder()
            .base_url(provider.base_url.clone())
            .text_model(provider.text_model.clone())
            .image_model(provider.image_model.clone())
            .max_retries(provider.max_retries)
            .timeout_secs(provider.timeout_secs)
            .build()?;
        Ok(config)
    }

    /// Session settings for a new journey.
    ///
    /// `art_style` falls back to the configured default.
    pub fn session_settings(
        &self,
        age_band: Option<AgeBand>,
        art_style: Option<ArtStyle>,
        illustrate: bool,
    ) -> Result<SessionSettings, BuilderError> {
        let art_style = art_style.unwrap_or_else(|| self.journey.default_art_style.clone());
        SessionSettings::builder()
            .age_band(age_band)
            .art_style(Some(art_style))
            .change_per_choice(self.journey.change_per_choice)
            .history_window(self.journey.history_window)
            .illustrate(illustrate)
            .image_size(self.provider.image_size)
            .call_timeout_secs(self.provider.call_timeout_secs)
            .cache(self.cache.clone())
            .build()
    }

    /// Fresh tracker over the configured stages.
    pub fn tracker(&self) -> OdysseyResult<StageTracker> {
        StageTracker::new(self.journey.stages.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odyssey_narrative::HERO_JOURNEY_STAGES;

    #[test]
    fn bundled_defaults_parse() {
        let config = OdysseyConfig::bundled().unwrap();
        assert_eq!(config.provider().text_model(), "gpt-3.5-turbo");
        assert_eq!(*config.provider().image_size(), ImageSize::Square);
        assert_eq!(config.journey().stages().as_slice(), HERO_JOURNEY_STAGES);
        assert_eq!(*config.journey().history_window(), 6);
        assert!(*config.cache().enabled());
    }

    #[test]
    fn settings_take_the_default_style() {
        let config = OdysseyConfig::bundled().unwrap();
        let settings = config
            .session_settings(Some(AgeBand::Young), None, false)
            .unwrap();

        assert_eq!(settings.art_style().as_ref(), Some(&ArtStyle::default()));
        assert_eq!(*settings.age_band(), Some(AgeBand::Young));
        assert!(!*settings.illustrate());
    }

    #[test]
    fn openai_config_mirrors_provider_section() {
        let config = OdysseyConfig::bundled().unwrap();
        let openai = config.openai_config().unwrap();
        assert_eq!(openai.image_model(), "dall-e-3");
        assert_eq!(*openai.timeout_secs(), 120);
    }
}
