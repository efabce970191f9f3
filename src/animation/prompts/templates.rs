/*!
 * Prompt templates for the animation pipeline.
 *
 * Every stage sends a fixed instruction text. Templates with placeholders
 * are rendered by plain substitution so the JSON braces in them survive.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::animation::document::{AnimationPlan, Section};

static PLANNING_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(section_id|section_title|section_json)\}").unwrap());

/// Instruction sent after the PDF block in the content-to-sections stage.
pub const SECTIONS_INSTRUCTION: &str = r#"Analyze the content of this PDF. Identify logical sections based on topics or chapters. Extract each section's main concepts, formulas, and examples. Create a JSON structure with the following format: {"sections": [{"id": "unique_id", "title": "section_title", "concepts": [...], "formulas": [{"description": "...", "latex": "..."}], "examples": [...]}]}. Make sure all formulas are correctly represented in LaTeX."#;

/// Planner template. Placeholders: `{section_json}`, `{section_id}`, `{section_title}`.
pub const PLANNING_TEMPLATE: &str = r#"Here is a section from the PDF:

{section_json}

Create a detailed animation plan for this section, including all concepts and formulas.
For each formula describe:
1. How it should appear (e.g., gradually, all at once)
2. Which elements should be highlighted or explained separately
3. What visual examples could help understand the formula

Present the result in JSON format:
{
    "section_id": "{section_id}",
    "section_title": "{section_title}",
    "animations": [
        {
            "type": "formula|concept|example",
            "content": "what to display",
            "latex": "latex representation if applicable",
            "steps": [
                {
                    "description": "step description",
                    "action": "animation type (Write, Transform, etc.)"
                }
            ]
        }
    ]
}"#;

/// Code generator template. Placeholder: `{plan_json}`.
pub const CODEGEN_TEMPLATE: &str = r#"Here is the animation plan for a section:

{plan_json}

Generate ManimLib code for this specific section. Create a Scene class named after the section title.

Use ManimLib syntax (3Blue1Brown's original Manim library, NOT the Community Edition).

Important syntax guidelines:
- Use 'from manimlib import *' instead of 'from manim import *'
- Use TexMobject or TextMobject instead of MathTex
- Use COLOR constants like RED, BLUE, etc. for colors
- Position objects with .to_edge(), .next_to(), etc.

Important requirements:
- Include code comments
- Use TexMobject for LaTeX formulas
- Add visual elements (colors, arrows, boxes) to highlight important parts
- Include self.play() methods for smooth animations
- Add self.wait() between key animations

Make sure the code is fully functional and can be run independently."#;

/// System prompt of the single-prompt generator.
pub const MANIM_EXPERT_SYSTEM: &str = r#"You are an expert level Manim (Python library that 3B1B uses) expert.
Return only code without any explanation. DO NOT ADD ANY TEXT TO THE ANIMATION.

Here are examples of scenes:
Square to circle animation:
```
from manim import *

class SquareToCircle(Scene):
    def construct(self):
        circle = Circle()
        square = Square()
        square.flip(RIGHT)
        square.rotate(-3 * TAU / 8)
        circle.set_fill(PINK, opacity=0.5)

        self.play(Create(square))
        self.play(Transform(square, circle))
        self.play(FadeOut(square))
```"#;

/// Appended to a query when a PDF is attached.
pub const PDF_CONTEXT_NOTE: &str = "Use the attached PDF document as context for the animation.";

/// Render the planner prompt for one section.
pub fn planning_prompt(section: &Section) -> String {
    let section_json = serde_json::to_string(section).unwrap_or_default();

    // One pass over the template: substituted values are never rescanned
    PLANNING_PLACEHOLDER
        .replace_all(PLANNING_TEMPLATE, |caps: &Captures| match &caps[1] {
            "section_id" => section.id.clone(),
            "section_title" => section.title.clone(),
            _ => section_json.clone(),
        })
        .into_owned()
}

/// Render the code generator prompt for one plan.
pub fn codegen_prompt(plan: &AnimationPlan) -> String {
    let plan_json = serde_json::to_string(plan).unwrap_or_default();
    CODEGEN_TEMPLATE.replace("{plan_json}", &plan_json)
}

/// Render the user text of the single-prompt generator.
pub fn generation_prompt(query: &str, has_pdf: bool, scene_name: Option<&str>) -> String {
    let mut prompt = query.trim().to_string();

    if let Some(name) = scene_name {
        prompt.push_str(&format!("\n\nThe scene MUST have a name {}.", name));
    }
    if has_pdf {
        prompt.push_str("\n\n");
        prompt.push_str(PDF_CONTEXT_NOTE);
    }

    prompt
}
