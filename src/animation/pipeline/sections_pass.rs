/*!
 * Content-to-sections pass.
 *
 * Sends the source document with a fixed instruction and parses the fenced
 * JSON reply into a [`SectionsDocument`].
 */

use log::debug;
use std::sync::Arc;

use crate::animation::document::{SectionsDocument, SourceDocument};
use crate::animation::extract::extract_json;
use crate::animation::prompts::SECTIONS_INSTRUCTION;
use crate::errors::StageError;
use crate::providers::{LlmClient, Prompt};

/// Stage name used in errors and logs.
pub const STAGE_NAME: &str = "sections";

/// Splits a document into sections with one model request.
#[derive(Debug, Clone)]
pub struct SectionsPass {
    client: Arc<dyn LlmClient>,
    model: String,
    max_tokens: u32,
}

impl SectionsPass {
    /// Create a new sections pass.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens,
        }
    }

    /// Build the request: the document first, then the instruction.
    pub fn build_prompt(&self, document: &SourceDocument) -> Prompt {
        document
            .attach(Prompt::new(self.model.clone(), self.max_tokens))
            .text(SECTIONS_INSTRUCTION)
    }

    /// Extract and normalize the sections of a document.
    ///
    /// A reply without a usable JSON block is a
    /// [`StageError::MalformedResponse`] carrying the raw reply. No retry.
    pub async fn extract_sections(
        &self,
        document: &SourceDocument,
    ) -> Result<SectionsDocument, StageError> {
        debug!(
            "Requesting sections for {:?} ({} bytes)",
            document.path,
            document.data.len()
        );

        let reply = self.client.ask(self.build_prompt(document)).await?;

        let mut sections: SectionsDocument =
            extract_json(&reply).map_err(|e| StageError::malformed(STAGE_NAME, e, &reply))?;
        sections.normalize();

        debug!("Model returned {} sections", sections.len());
        Ok(sections)
    }
}
