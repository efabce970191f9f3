use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

use crate::animation::generator::{DEFAULT_GENERATOR_MAX_TOKENS, DEFAULT_GENERATOR_MODEL};
use crate::animation::merge::DEFAULT_SCENE_BASE;
use crate::animation::pipeline::codegen_pass::DEFAULT_CODE_LANGUAGE;
use crate::animation::pipeline::orchestrator::{DEFAULT_PIPELINE_MAX_TOKENS, DEFAULT_PIPELINE_MODEL};
use crate::animation::pipeline::PipelineConfig;
use crate::render::local::{DEFAULT_QUALITY, DEFAULT_RENDER_COMMAND, DEFAULT_RENDER_TIMEOUT_SECS};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Language model provider
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Section pipeline settings
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Single-prompt generator settings
    #[serde(default)]
    pub generator: GeneratorSettings,

    /// Rendering settings
    #[serde(default)]
    pub render: RenderSettings,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Language model provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    // @provider: Anthropic Messages API
    #[default]
    Anthropic,
}

impl LlmProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Anthropic => "anthropic".to_string(),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type", default)]
    pub provider_type: LlmProvider,

    // @field: Fallback model when a stage sets none
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_anthropic_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: LlmProvider::default(),
            model: String::new(),
            api_key: String::new(),
            endpoint: default_anthropic_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Section pipeline configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineSettings {
    /// Model used by all pipeline stages
    #[serde(default = "default_pipeline_model")]
    pub model: String,

    /// Maximum output tokens per request
    #[serde(default = "default_pipeline_max_tokens")]
    pub max_tokens: u32,

    /// Fence language collected from code replies
    #[serde(default = "default_code_language")]
    pub code_language: String,

    /// Base class a merged scene must derive from
    #[serde(default = "default_scene_base_class")]
    pub scene_base_class: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            model: default_pipeline_model(),
            max_tokens: default_pipeline_max_tokens(),
            code_language: default_code_language(),
            scene_base_class: default_scene_base_class(),
        }
    }
}

/// Single-prompt generator configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeneratorSettings {
    /// Model name
    #[serde(default = "default_generator_model")]
    pub model: String,

    /// Maximum output tokens
    #[serde(default = "default_generator_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            model: default_generator_model(),
            max_tokens: default_generator_max_tokens(),
        }
    }
}

/// Rendering configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RenderSettings {
    /// Render command line, scene file and name are appended
    #[serde(default = "default_render_command")]
    pub command: String,

    /// Quality directory the command writes videos to
    #[serde(default = "default_quality")]
    pub quality: String,

    /// Timeout per rendered scene in seconds
    #[serde(default = "default_render_timeout_secs")]
    pub timeout_secs: u64,

    /// Directory scripts are rendered in
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: String,

    /// Directory rendered videos are saved to
    #[serde(default = "default_videos_dir")]
    pub videos_dir: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            command: default_render_command(),
            quality: default_quality(),
            timeout_secs: default_render_timeout_secs(),
            workspace_dir: default_workspace_dir(),
            videos_dir: default_videos_dir(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_pipeline_model() -> String {
    DEFAULT_PIPELINE_MODEL.to_string()
}

fn default_pipeline_max_tokens() -> u32 {
    DEFAULT_PIPELINE_MAX_TOKENS
}

fn default_code_language() -> String {
    DEFAULT_CODE_LANGUAGE.to_string()
}

fn default_scene_base_class() -> String {
    DEFAULT_SCENE_BASE.to_string()
}

fn default_generator_model() -> String {
    DEFAULT_GENERATOR_MODEL.to_string()
}

fn default_generator_max_tokens() -> u32 {
    DEFAULT_GENERATOR_MAX_TOKENS
}

fn default_render_command() -> String {
    DEFAULT_RENDER_COMMAND.to_string()
}

fn default_quality() -> String {
    DEFAULT_QUALITY.to_string()
}

fn default_render_timeout_secs() -> u64 {
    DEFAULT_RENDER_TIMEOUT_SECS
}

fn default_workspace_dir() -> String {
    "render_workspace".to_string()
}

fn default_videos_dir() -> String {
    "videos".to_string()
}

impl Config {
    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.provider.api_key.trim().is_empty() {
            return Err(anyhow!(
                "API key is required for {} provider",
                self.provider.provider_type.display_name()
            ));
        }

        url::Url::parse(&self.provider.endpoint)
            .with_context(|| format!("Invalid provider endpoint: {}", self.provider.endpoint))?;

        if self.pipeline.max_tokens == 0 {
            return Err(anyhow!("pipeline.max_tokens must be greater than 0"));
        }
        if self.generator.max_tokens == 0 {
            return Err(anyhow!("generator.max_tokens must be greater than 0"));
        }

        Ok(())
    }

    /// Model used by the section pipeline
    pub fn pipeline_model(&self) -> String {
        Self::first_non_empty(&self.pipeline.model, &self.provider.model, DEFAULT_PIPELINE_MODEL)
    }

    /// Model used by the single-prompt generator
    pub fn generator_model(&self) -> String {
        Self::first_non_empty(&self.generator.model, &self.provider.model, DEFAULT_GENERATOR_MODEL)
    }

    /// Override the model of every stage
    pub fn override_model(&mut self, model: &str) {
        self.provider.model = model.to_string();
        self.pipeline.model = model.to_string();
        self.generator.model = model.to_string();
    }

    /// Orchestrator settings derived from this configuration
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            model: self.pipeline_model(),
            max_tokens: self.pipeline.max_tokens,
            code_language: self.pipeline.code_language.clone(),
            scene_base_class: self.pipeline.scene_base_class.clone(),
        }
    }

    fn first_non_empty(primary: &str, fallback: &str, default: &str) -> String {
        [primary, fallback]
            .into_iter()
            .find(|m| !m.trim().is_empty())
            .unwrap_or(default)
            .to_string()
    }
}
