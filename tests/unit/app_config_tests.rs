/*!
 * Tests for application configuration functionality
 */

use pageglot::app_config::{Config, LogLevel, TranslationProvider};

/// Test default configuration values
#[test]
fn test_default_config_should_have_documented_defaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "ar");
    assert_eq!(config.translation.provider, TranslationProvider::LibreTranslate);
    assert_eq!(config.translation.common.max_attempts, 3);
    assert_eq!(config.translation.common.retry_backoff_ms, 500);
    assert_eq!(config.translation.common.rate_limit_delay_ms, 200);
    assert_eq!(config.layout.font_size, 12.0);
    assert_eq!(config.layout.margin, 5.0);
    assert_eq!(config.layout.gap, 5.0);
    assert_eq!(config.layout.column_gap, 10.0);
    assert!(!config.layout.adaptive_font_size);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_with_bad_values_should_fail() {
    let mut config = Config::default();
    config.source_language = "xyz".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.target_language = "en".to_string();
    assert!(config.validate().is_err(), "source and target must differ");

    let mut config = Config::default();
    config.translation.common.max_attempts = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.common.batch_size = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.layout.font_size = 0.0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.layout.min_font_size = 20.0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.layout.background_opacity = 1.5;
    assert!(config.validate().is_err());
}

#[test]
fn test_public_libretranslate_endpoint_should_require_api_key() {
    let mut config = Config::default();
    for provider in config.translation.available_providers.iter_mut() {
        if provider.provider_type == "libretranslate" {
            provider.endpoint = "https://libretranslate.com".to_string();
        }
    }
    assert!(config.validate().is_err());

    for provider in config.translation.available_providers.iter_mut() {
        if provider.provider_type == "libretranslate" {
            provider.api_key = "secret".to_string();
        }
    }
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_config_json_should_fill_defaults() {
    let json = r#"{
        "source_language": "en",
        "target_language": "fa",
        "translation": { "provider": "ollama" },
        "layout": { "font_size": 10.0 }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.translation.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.translation.common.batch_size, 10);
    assert_eq!(config.layout.font_size, 10.0);
    assert_eq!(config.layout.line_height_factor, 1.2);
    assert!(config.output.write_metadata);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_should_survive_json_round_trip() {
    let mut config = Config::default();
    config.layout.adaptive_font_size = true;
    config.log_level = LogLevel::Debug;

    let json = serde_json::to_string_pretty(&config).unwrap();
    let back: Config = serde_json::from_str(&json).unwrap();

    assert!(back.layout.adaptive_font_size);
    assert_eq!(back.log_level, LogLevel::Debug);
    assert_eq!(back.translation.available_providers.len(), 2);
}
