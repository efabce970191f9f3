/*!
 * Section pipeline for document-to-animation generation.
 *
 * The pipeline processes a document through three passes:
 * 1. **Sections Pass**: Split the document into sections with concepts and formulas
 * 2. **Planning Pass**: Plan the animation of each section as JSON
 * 3. **Codegen Pass**: Generate scene code for each plan
 *
 * The orchestrator then merges all generated code into a single file.
 */

pub mod codegen_pass;
pub mod orchestrator;
pub mod planning_pass;
pub mod sections_pass;

// Re-export types used externally
pub use codegen_pass::CodegenPass;
pub use orchestrator::{
    AnimationPipeline, PipelineConfig, PipelinePhase, PipelineProgress, PipelineReport,
    SkippedSection,
};
pub use planning_pass::PlanningPass;
pub use sections_pass::SectionsPass;
