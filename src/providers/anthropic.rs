use std::time::Duration;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Serialize, Deserialize};
use reqwest::Client;
use log::{debug, error};

use crate::errors::ProviderError;
use crate::providers::{Prompt, PromptPart, Provider};

/// Default request timeout for the Anthropic API
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Anthropic client for interacting with Anthropic API
#[derive(Debug)]
pub struct Anthropic {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
}

/// Anthropic message request
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<AnthropicMessage>,

    /// System prompt to guide the AI
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    max_tokens: u32,
}

/// Anthropic message format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnthropicMessage {
    /// Role of the message sender (user, assistant)
    pub role: String,

    /// Content of the message
    pub content: MessageContent,
}

/// Message content: either a bare string or a list of typed blocks
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text content
    Text(String),
    /// Structured content blocks
    Blocks(Vec<ContentBlock>),
}

/// A typed content block inside a user message
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// Text block
    Text {
        /// The text
        text: String,
    },
    /// Attached document
    Document {
        /// Where the document bytes come from
        source: DocumentSource,
    },
}

/// Inline document source
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DocumentSource {
    /// Source kind, always "base64" here
    #[serde(rename = "type")]
    pub source_type: String,
    /// MIME type of the document
    pub media_type: String,
    /// Base64-encoded document bytes
    pub data: String,
}

impl ContentBlock {
    /// Build a base64 document block from raw bytes
    pub fn document(media_type: &str, data: &[u8]) -> Self {
        ContentBlock::Document {
            source: DocumentSource {
                source_type: "base64".to_string(),
                media_type: media_type.to_string(),
                data: BASE64.encode(data),
            },
        }
    }
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens
    pub input_tokens: u32,
    /// Number of output tokens
    pub output_tokens: u32,
}

/// Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    /// The content of the response
    pub content: Vec<AnthropicContent>,
    /// Why generation stopped
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Token usage information
    pub usage: TokenUsage,
}

/// Individual content block in an Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicContent {
    /// The type of content
    #[serde(rename = "type")]
    pub content_type: String,

    /// The actual text content (empty for non-text blocks)
    #[serde(default)]
    pub text: String,
}

impl AnthropicRequest {
    /// Create a new Anthropic request
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            system: None,
            temperature: None,
            max_tokens,
        }
    }

    /// Add a plain text message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(AnthropicMessage {
            role: role.into(),
            content: MessageContent::Text(content.into()),
        });
        self
    }

    /// Add a message made of content blocks
    pub fn add_blocks(mut self, role: impl Into<String>, blocks: Vec<ContentBlock>) -> Self {
        self.messages.push(AnthropicMessage {
            role: role.into(),
            content: MessageContent::Blocks(blocks),
        });
        self
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl Anthropic {
    /// Create a new Anthropic client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::with_timeout(api_key, endpoint, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a new Anthropic client with a custom request timeout
    pub fn with_timeout(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn messages_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.anthropic.com/v1/messages".to_string()
        } else {
            format!("{}/v1/messages", self.endpoint.trim_end_matches('/'))
        }
    }

    fn map_status(status: u16, message: String) -> ProviderError {
        match status {
            401 | 403 => ProviderError::AuthenticationError(message),
            429 => ProviderError::RateLimitExceeded(message),
            _ => ProviderError::ApiError { status_code: status, message },
        }
    }
}

#[async_trait]
impl Provider for Anthropic {
    type Request = AnthropicRequest;
    type Response = AnthropicResponse;

    /// Complete a messages request
    async fn complete(&self, request: AnthropicRequest) -> Result<AnthropicResponse, ProviderError> {
        let api_url = self.messages_url();
        debug!("Sending request to {} (model {})", api_url, request.model);

        let response = self.client.post(&api_url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(format!("Failed to send request to Anthropic API: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Anthropic API error ({}): {}", status, error_text);
            return Err(Self::map_status(status.as_u16(), error_text));
        }

        let anthropic_response = response.json::<AnthropicResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Anthropic API response: {}", e)))?;

        debug!(
            "Anthropic usage: {} input / {} output tokens",
            anthropic_response.usage.input_tokens, anthropic_response.usage.output_tokens
        );

        Ok(anthropic_response)
    }

    fn build_request(&self, prompt: &Prompt) -> AnthropicRequest {
        let mut request = AnthropicRequest::new(prompt.model.clone(), prompt.max_tokens);

        request = if prompt.has_document() {
            let blocks = prompt.parts.iter()
                .map(|part| match part {
                    PromptPart::Text(text) => ContentBlock::Text { text: text.clone() },
                    PromptPart::Document { media_type, data } => ContentBlock::document(media_type, data),
                })
                .collect();
            request.add_blocks("user", blocks)
        } else {
            request.add_message("user", prompt.user_text())
        };

        if let Some(system) = &prompt.system {
            request = request.system(system.clone());
        }
        if let Some(temperature) = prompt.temperature {
            request = request.temperature(temperature);
        }
        request
    }

    /// Text of the first text block of the reply
    fn extract_text(response: &AnthropicResponse) -> String {
        response.content.iter()
            .find(|c| c.content_type == "text")
            .map(|c| c.text.clone())
            .unwrap_or_default()
    }
}
