//! Layered configuration loading.

use odyssey::{AgeBand, ArtStyle, ImageSize, OdysseyConfig};
use std::fs;

fn write_config(body: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("odyssey.toml");
    fs::write(&path, body).unwrap();
    (dir, path)
}

#[test]
fn file_overrides_only_what_it_names() {
    let (_dir, path) = write_config(
        r#"
[provider]
text_model = "gpt-4o-mini"
image_size = "1792x1024"
max_retries = 1

[journey]
default_art_style = "Watercolor"
"#,
    );

    let config = OdysseyConfig::from_file(&path).unwrap();

    assert_eq!(config.provider().text_model(), "gpt-4o-mini");
    assert_eq!(config.provider().image_model(), "dall-e-3");
    assert_eq!(*config.provider().image_size(), ImageSize::Landscape);
    assert_eq!(*config.provider().max_retries(), Some(1));
    assert_eq!(config.journey().stages().len(), 12);
    assert_eq!(
        config.journey().default_art_style(),
        &ArtStyle::new("Watercolor")
    );

    let openai = config.openai_config().unwrap();
    assert_eq!(openai.text_model(), "gpt-4o-mini");
    assert_eq!(*openai.max_retries(), Some(1));
}

#[test]
fn custom_stages_drive_the_tracker() {
    let (_dir, path) = write_config(
        r#"
[journey]
stages = ["Home", "Away", "Home Again"]
change_per_choice = 50.0
"#,
    );

    let config = OdysseyConfig::from_file(&path).unwrap();
    let tracker = config.tracker().unwrap();
    assert_eq!(tracker.stage_count(), 3);
    assert_eq!(tracker.current_stage(), "Home");

    let settings = config.session_settings(Some(AgeBand::Teen), None, true).unwrap();
    assert_eq!(*settings.change_per_choice(), Some(50.0));
    assert_eq!(*settings.history_window(), 6);
}

#[test]
fn empty_stage_list_is_rejected() {
    let (_dir, path) = write_config("[journey]\nstages = []\n");

    let err = OdysseyConfig::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("journey.stages"));
}

#[test]
fn non_positive_change_per_choice_is_rejected() {
    let (_dir, path) = write_config("[journey]\nchange_per_choice = 0.0\n");
    assert!(OdysseyConfig::from_file(&path).is_err());
}

#[test]
fn cache_and_storage_sections_are_honored() {
    let (dir, path) = write_config(
        r#"
[cache]
enabled = false
ttl_secs = 30

[storage]
session_dir = "/tmp/odyssey-test/sessions"
"#,
    );

    let config = OdysseyConfig::from_file(&path).unwrap();
    assert!(!*config.cache().enabled());
    assert_eq!(*config.cache().ttl_secs(), Some(30));
    assert_eq!(
        config.storage().session_dir(),
        std::path::PathBuf::from("/tmp/odyssey-test/sessions")
    );
    assert!(config.storage().media_dir().ends_with("media"));

    let settings = config.session_settings(None, None, false).unwrap();
    assert!(!*settings.cache().enabled());
    drop(dir);
}

#[test]
fn malformed_file_is_a_config_error() {
    let (_dir, path) = write_config("[provider\ntext_model = ");

    let err = OdysseyConfig::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to read"));
}
