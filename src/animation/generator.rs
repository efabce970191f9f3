/*!
 * Single-prompt scene generation.
 *
 * A free-text query, optionally with a PDF attached as context, is sent once
 * with the Manim-expert system prompt. The reply is cleaned into a program
 * and the classes it declares are listed so they can be rendered.
 */

use anyhow::Result;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::sync::Arc;

use crate::animation::document::SourceDocument;
use crate::animation::prompts::{generation_prompt, MANIM_EXPERT_SYSTEM};
use crate::errors::ProviderError;
use crate::file_utils::FileManager;
use crate::providers::{LlmClient, Prompt};

/// Default model of the single-prompt generator.
pub const DEFAULT_GENERATOR_MODEL: &str = "claude-3-7-sonnet-latest";

/// Default output size of the single-prompt generator.
pub const DEFAULT_GENERATOR_MAX_TOKENS: u32 = 20096;

static CLASS_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*class\s+(\w+)").unwrap());

/// What to generate.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// Description of the animation
    pub query: String,

    /// Document attached as context
    pub pdf: Option<SourceDocument>,

    /// Required scene class name
    pub scene_name: Option<String>,
}

impl GenerationRequest {
    /// Request for a bare query.
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Default::default()
        }
    }

    /// Attach a context document.
    pub fn with_pdf(mut self, pdf: SourceDocument) -> Self {
        self.pdf = Some(pdf);
        self
    }

    /// Require a scene name.
    pub fn with_scene_name(mut self, name: &str) -> Self {
        self.scene_name = Some(name.to_string());
        self
    }
}

/// A cleaned program and the classes it declares.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedProgram {
    /// Program source
    pub source: String,

    /// Declared classes, in order
    pub class_names: Vec<String>,
}

/// Generates a whole program from one query.
#[derive(Debug, Clone)]
pub struct Generator {
    client: Arc<dyn LlmClient>,
    model: String,
    max_tokens: u32,
}

impl Generator {
    /// Create a generator.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens,
        }
    }

    /// Build the request. An attached PDF precedes the query text.
    pub fn build_prompt(&self, request: &GenerationRequest) -> Prompt {
        let mut prompt = Prompt::new(self.model.clone(), self.max_tokens).system(MANIM_EXPERT_SYSTEM);

        if let Some(pdf) = &request.pdf {
            prompt = pdf.attach(prompt);
        }

        prompt.text(generation_prompt(
            &request.query,
            request.pdf.is_some(),
            request.scene_name.as_deref(),
        ))
    }

    /// Ask for a program and clean the reply.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedProgram, ProviderError> {
        info!("Generating animation for: {}", request.query);

        let reply = self.client.ask(self.build_prompt(request)).await?;
        let source = postprocess_program(&reply);
        let class_names = class_names(&source);

        debug!("Generated program declares {:?}", class_names);
        Ok(GeneratedProgram { source, class_names })
    }

    /// Generate a program and save it to `path`.
    pub async fn generate_to_file<P: AsRef<Path>>(
        &self,
        request: &GenerationRequest,
        path: P,
    ) -> Result<GeneratedProgram> {
        let program = self.generate(request).await?;
        FileManager::write_to_file(&path, &program.source)?;

        info!("Saved program with scenes to {}", path.as_ref().display());
        Ok(program)
    }
}

/// Strip code fences and a leading `python` tag from a reply.
pub fn postprocess_program(reply: &str) -> String {
    let without_fences = reply.replace("```", "");
    let trimmed = without_fences.trim_start();

    trimmed
        .strip_prefix("python")
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

/// Every class declared in `source`, whatever its base.
pub fn class_names(source: &str) -> Vec<String> {
    CLASS_DECLARATION
        .captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}
