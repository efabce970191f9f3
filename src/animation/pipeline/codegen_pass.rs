/*!
 * Code generator pass.
 *
 * Sends an [`AnimationPlan`] with the ManimLib instructions and keeps the
 * fenced code of the reply. A reply without code fences is kept verbatim.
 */

use log::{debug, warn};
use std::sync::Arc;

use crate::animation::document::{AnimationPlan, GeneratedCode};
use crate::animation::extract::extract_code_blocks;
use crate::animation::prompts::codegen_prompt;
use crate::errors::StageError;
use crate::providers::{LlmClient, Prompt};

/// Default fence language of generated code.
pub const DEFAULT_CODE_LANGUAGE: &str = "python";

/// Generates scene code for one plan.
#[derive(Debug, Clone)]
pub struct CodegenPass {
    client: Arc<dyn LlmClient>,
    model: String,
    max_tokens: u32,
    language: String,
}

impl CodegenPass {
    /// Create a new code generator pass.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens,
            language: DEFAULT_CODE_LANGUAGE.to_string(),
        }
    }

    /// Set the fence language to collect.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Generate the code for `plan`.
    pub async fn generate_code(&self, plan: &AnimationPlan) -> Result<GeneratedCode, StageError> {
        debug!("Generating code for '{}'", plan.section_title);

        let prompt = Prompt::new(self.model.clone(), self.max_tokens).text(codegen_prompt(plan));
        let reply = self.client.ask(prompt).await?;

        Ok(GeneratedCode {
            section_id: plan.section_id.clone(),
            section_title: plan.section_title.clone(),
            source: collect_code(&reply, &self.language),
        })
    }
}

/// Every fenced block of `language`, joined by a blank line; the reply itself
/// when there is none.
pub fn collect_code(reply: &str, language: &str) -> String {
    let blocks = extract_code_blocks(reply, language);

    if blocks.is_empty() {
        warn!("No ```{} block in reply, keeping it verbatim", language);
        return reply.to_string();
    }

    blocks.join("\n\n")
}
