/*!
 * Prompt texts for animation generation.
 *
 * This module provides:
 * - The fixed instructions of the three pipeline stages
 * - The Manim-expert system prompt of the single-prompt generator
 */

pub mod templates;

// Re-export main items
pub use templates::{
    codegen_prompt, generation_prompt, planning_prompt, MANIM_EXPERT_SYSTEM, SECTIONS_INSTRUCTION,
};
