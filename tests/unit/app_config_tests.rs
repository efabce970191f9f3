/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use std::str::FromStr;

use manimgen::app_config::{Config, LlmProvider, LogLevel};
use crate::common;

fn valid_config() -> Config {
    let mut config = Config::default();
    config.provider.api_key = "sk-ant-test".to_string();
    config
}

/// Test default configuration values
#[test]
fn test_defaultConfig_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.provider.provider_type, LlmProvider::Anthropic);
    assert_eq!(config.provider.endpoint, "https://api.anthropic.com");
    assert_eq!(config.provider.timeout_secs, 120);
    assert_eq!(config.pipeline.model, "claude-3-7-sonnet-20250219");
    assert_eq!(config.pipeline.max_tokens, 4000);
    assert_eq!(config.pipeline.code_language, "python");
    assert_eq!(config.pipeline.scene_base_class, "Scene");
    assert_eq!(config.generator.model, "claude-3-7-sonnet-latest");
    assert_eq!(config.generator.max_tokens, 20096);
    assert_eq!(config.render.command, "manim");
    assert_eq!(config.render.videos_dir, "videos");
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_validate_withApiKey_shouldPass() {
    assert!(valid_config().validate().is_ok());
}

#[test]
fn test_validate_withBlankApiKey_shouldFail() {
    let mut config = valid_config();
    config.provider.api_key = "   ".to_string();

    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("API key is required"));
}

#[test]
fn test_validate_withInvalidEndpoint_shouldFail() {
    let mut config = valid_config();
    config.provider.endpoint = "not a url".to_string();

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withZeroMaxTokens_shouldFail() {
    let mut config = valid_config();
    config.pipeline.max_tokens = 0;
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.generator.max_tokens = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_overrideModel_shouldApplyToEveryStage() {
    let mut config = Config::default();
    config.override_model("claude-opus");

    assert_eq!(config.pipeline_model(), "claude-opus");
    assert_eq!(config.generator_model(), "claude-opus");
    assert_eq!(config.pipeline_config().model, "claude-opus");
}

#[test]
fn test_pipelineConfig_shouldCarryPipelineSettings() {
    let mut config = Config::default();
    config.pipeline.max_tokens = 1234;
    config.pipeline.scene_base_class = "ThreeDScene".to_string();

    let pipeline = config.pipeline_config();
    assert_eq!(pipeline.max_tokens, 1234);
    assert_eq!(pipeline.scene_base_class, "ThreeDScene");
    assert_eq!(pipeline.code_language, "python");
}

#[test]
fn test_saveThenLoad_shouldPreserveValues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let mut config = valid_config();
    config.render.quality = "480p15".to_string();
    config.log_level = LogLevel::Debug;
    config.save(&path)?;

    let loaded = Config::load(&path)?;
    assert_eq!(loaded.provider.api_key, "sk-ant-test");
    assert_eq!(loaded.render.quality, "480p15");
    assert_eq!(loaded.log_level, LogLevel::Debug);
    Ok(())
}

#[test]
fn test_load_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{"provider": {"type": "anthropic", "api_key": "k"}, "log_level": "warn"}"#,
    )?;

    let config = Config::load(&path)?;
    assert_eq!(config.provider.api_key, "k");
    assert_eq!(config.provider.endpoint, "https://api.anthropic.com");
    assert_eq!(config.log_level, LogLevel::Warn);
    assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(config.render.timeout_secs, 600);
    Ok(())
}

#[test]
fn test_load_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load(&path).is_err());
    Ok(())
}

#[test]
fn test_llmProvider_fromStr_shouldBeCaseInsensitive() {
    assert_eq!(LlmProvider::from_str("Anthropic").unwrap(), LlmProvider::Anthropic);
    assert!(LlmProvider::from_str("ollama").is_err());
    assert_eq!(LlmProvider::Anthropic.to_string(), "anthropic");
}
