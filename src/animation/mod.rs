/*!
 * Animation code generation using language models.
 *
 * This module turns teaching material into Manim scene code. It is split
 * into several submodules:
 *
 * - `document`: Data model shared by the pipeline stages
 * - `extract`: Fenced JSON/code block extraction from model replies
 * - `prompts`: Fixed prompt texts
 * - `pipeline`: The section pipeline (sections, planning, codegen, orchestrator)
 * - `merge`: Merging of per-section code into one file
 * - `generator`: Single-prompt program generation
 */

// Re-export document model types
pub use self::document::{
    AnimationKind, AnimationPlan, AnimationStep, Formula, GeneratedCode, Section,
    SectionsDocument, SourceDocument, SubStep,
};

// Re-export main entry points
pub use self::generator::{GeneratedProgram, GenerationRequest, Generator};
pub use self::merge::{CodeMerger, MergedArtifact, RegexSceneExtractor, SceneDefinition, SceneExtractor};
pub use self::pipeline::{AnimationPipeline, PipelineConfig, PipelineProgress, PipelineReport};

// Submodules
pub mod document;
pub mod extract;
pub mod generator;
pub mod merge;
pub mod pipeline;
pub mod prompts;
