/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use std::path::PathBuf;
use slidecast::app_config::{Config, LogLevel, SpeechProvider};
use crate::common;

/// Test that the default configuration matches the documented defaults
#[test]
fn test_default_config_shouldUseFrenchGoogleAndFullHd() {
    let config = Config::default();

    assert_eq!(config.speech.provider, SpeechProvider::Google);
    assert_eq!(config.speech.language, "fr");
    assert_eq!(config.speech.max_concurrent_requests, None);
    assert_eq!(config.encoder.width, 1920);
    assert_eq!(config.encoder.height, 1080);
    assert_eq!(config.encoder.aspect_ratio, "16/9");
    assert_eq!(config.encoder.video_codec, "libx264");
    assert_eq!(config.encoder.audio_codec, "aac");
    assert_eq!(config.encoder.pixel_format, "yuv420p");
    assert_eq!(config.workspace.output_dir, PathBuf::from("output"));
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test that a partial JSON file picks up defaults for missing fields
#[test]
fn test_load_or_create_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{ "speech": { "provider": "espeak", "language": "en" }, "log_level": "debug" }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.speech.provider, SpeechProvider::Espeak);
    assert_eq!(config.speech.language, "en");
    assert_eq!(config.speech.command, "espeak-ng");
    assert_eq!(config.encoder.framerate, 25);
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

/// Test that a missing file is created with defaults
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;
    assert!(path.exists());

    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.speech.language, config.speech.language);
    assert_eq!(reloaded.encoder.width, config.encoder.width);
    Ok(())
}

#[test]
fn test_load_or_create_withMalformedFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    let error = Config::load_or_create(&path).unwrap_err();
    assert!(format!("{:#}", error).contains("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_validate_withZeroConcurrency_shouldFail() {
    let mut config = Config::default();
    config.speech.max_concurrent_requests = Some(0);
    assert!(config.validate().is_err());

    config.speech.max_concurrent_requests = Some(1);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withOddResolution_shouldFail() {
    let mut config = Config::default();
    config.encoder.width = 1921;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withBadEndpointOrAspect_shouldFail() {
    let mut config = Config::default();
    config.speech.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());

    // Endpoint is only used by the Google provider
    config.speech.provider = SpeechProvider::Espeak;
    assert!(config.validate().is_ok());

    config.encoder.aspect_ratio = "wide".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withEmptyLanguageOrCodec_shouldFail() {
    let mut config = Config::default();
    config.speech.language = "  ".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.encoder.audio_codec = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_speech_provider_shouldReportNames() {
    assert_eq!(SpeechProvider::Espeak.to_string(), "espeak");
    assert_eq!(SpeechProvider::Google.display_name(), "Google TTS");
}
