/*!
 * Section planner pass.
 *
 * Turns one [`Section`] into an [`AnimationPlan`] with one model request.
 */

use log::debug;
use std::sync::Arc;

use crate::animation::document::{AnimationPlan, Section};
use crate::animation::extract::extract_json;
use crate::animation::prompts::planning_prompt;
use crate::errors::StageError;
use crate::providers::{LlmClient, Prompt};

/// Stage name used in errors and logs.
pub const STAGE_NAME: &str = "planning";

/// Plans the animation of a single section.
#[derive(Debug, Clone)]
pub struct PlanningPass {
    client: Arc<dyn LlmClient>,
    model: String,
    max_tokens: u32,
}

impl PlanningPass {
    /// Create a new planning pass.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens,
        }
    }

    /// Request a plan for `section`.
    ///
    /// Sections without concepts, formulas, or examples are sent as they are;
    /// a plan with zero animations is valid. Missing `section_id` and
    /// `section_title` are taken from the section.
    pub async fn plan_section(&self, section: &Section) -> Result<AnimationPlan, StageError> {
        debug!("Planning section '{}' ({})", section.title, section.id);

        let prompt = Prompt::new(self.model.clone(), self.max_tokens).text(planning_prompt(section));
        let reply = self.client.ask(prompt).await?;

        let mut plan: AnimationPlan =
            extract_json(&reply).map_err(|e| StageError::malformed(STAGE_NAME, e, &reply))?;

        if plan.section_id.trim().is_empty() {
            plan.section_id = section.id.clone();
        }
        if plan.section_title.trim().is_empty() {
            plan.section_title = section.title.clone();
        }

        debug!(
            "Plan for '{}': {} animations, {} steps",
            plan.section_title,
            plan.animations.len(),
            plan.sub_step_count()
        );
        Ok(plan)
    }
}
