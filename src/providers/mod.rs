/*!
 * Provider implementations for language-model services.
 *
 * This module contains client implementations for the model backends:
 * - Anthropic: Anthropic Messages API integration
 * - Mock: scripted in-process provider used by tests
 *
 * Every stage of the generation pipeline talks to a model through the
 * object-safe [`LlmClient`] trait, which is blanket-implemented for any
 * [`Provider`]. The client is built once and injected where needed.
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// One piece of user content sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptPart {
    /// Plain instruction or data text
    Text(String),
    /// A binary document attached as context (e.g. a PDF)
    Document {
        /// MIME type of the document
        media_type: String,
        /// Raw document bytes
        data: Bytes,
    },
}

/// Provider-neutral description of a single model request.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    /// Model identifier
    pub model: String,
    /// Optional system prompt
    pub system: Option<String>,
    /// User content, in order
    pub parts: Vec<PromptPart>,
    /// Maximum output size in tokens
    pub max_tokens: u32,
    /// Sampling temperature, provider default when unset
    pub temperature: Option<f32>,
}

impl Prompt {
    /// Create an empty prompt for the given model.
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            system: None,
            parts: Vec::new(),
            max_tokens,
            temperature: None,
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Append a text part
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(PromptPart::Text(text.into()));
        self
    }

    /// Append a document part
    pub fn document(mut self, media_type: impl Into<String>, data: Bytes) -> Self {
        self.parts.push(PromptPart::Document {
            media_type: media_type.into(),
            data,
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// All text parts joined by blank lines.
    pub fn user_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                PromptPart::Text(text) => Some(text.as_str()),
                PromptPart::Document { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Whether a document part is attached.
    pub fn has_document(&self) -> bool {
        self.parts.iter().any(|part| matches!(part, PromptPart::Document { .. }))
    }
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably behind [`LlmClient`].
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Translate a provider-neutral prompt into this provider's request type
    fn build_request(&self, prompt: &Prompt) -> Self::Request;

    /// Extract text from the provider response
    ///
    /// # Arguments
    /// * `response` - The response from the provider
    ///
    /// # Returns
    /// * `String` - The extracted text
    fn extract_text(response: &Self::Response) -> String;
}

/// Object-safe entry point used by the generation stages.
#[async_trait]
pub trait LlmClient: Send + Sync + Debug {
    /// Send one prompt and wait for the complete reply text.
    async fn ask(&self, prompt: Prompt) -> Result<String, ProviderError>;
}

#[async_trait]
impl<P: Provider> LlmClient for P {
    async fn ask(&self, prompt: Prompt) -> Result<String, ProviderError> {
        let request = self.build_request(&prompt);
        let response = self.complete(request).await?;
        Ok(P::extract_text(&response))
    }
}

pub mod anthropic;
pub mod mock;
