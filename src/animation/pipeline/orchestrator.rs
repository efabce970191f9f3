/*!
 * Pipeline orchestrator for turning a document into scene code.
 *
 * The orchestrator runs the passes strictly in order:
 * 1. Sections Pass: split the document into sections
 * 2. Planning Pass and Codegen Pass: once per section, in section order
 * 3. Merge: combine every generated file into one
 *
 * Artifacts are written into the output directory as they are produced.
 */

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::animation::document::{AnimationPlan, GeneratedCode, Section, SourceDocument};
use crate::animation::merge::{CodeMerger, DEFAULT_SCENE_BASE};
use crate::errors::StageError;
use crate::file_utils::FileManager;
use crate::providers::LlmClient;

use super::codegen_pass::{CodegenPass, DEFAULT_CODE_LANGUAGE};
use super::planning_pass::PlanningPass;
use super::sections_pass::SectionsPass;

/// File holding every extracted section.
pub const SECTIONS_FILE: &str = "all_sections.json";

/// File holding every animation plan.
pub const PLANS_FILE: &str = "all_animation_plans.json";

/// File holding the merged code.
pub const COMBINED_FILE: &str = "combined_animation.py";

/// Default model of every pipeline stage.
pub const DEFAULT_PIPELINE_MODEL: &str = "claude-3-7-sonnet-20250219";

/// Default output size of every pipeline stage.
pub const DEFAULT_PIPELINE_MAX_TOKENS: u32 = 4000;

/// Configuration for the animation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Model used by all three stages
    pub model: String,

    /// Maximum output tokens per request
    pub max_tokens: u32,

    /// Fence language collected from code replies
    pub code_language: String,

    /// Base class a merged scene must derive from
    pub scene_base_class: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_PIPELINE_MODEL.to_string(),
            max_tokens: DEFAULT_PIPELINE_MAX_TOKENS,
            code_language: DEFAULT_CODE_LANGUAGE.to_string(),
            scene_base_class: DEFAULT_SCENE_BASE.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Use another model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Set the output size per request.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the base class of merged scenes.
    pub fn with_scene_base_class(mut self, base_class: &str) -> Self {
        self.scene_base_class = base_class.to_string();
        self
    }
}

/// Phases of the animation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    /// Splitting the document into sections
    Extraction,
    /// Planning and generating code per section
    Generation,
    /// Writing the merged artifacts
    Merging,
}

/// Progress information during pipeline execution.
#[derive(Debug, Clone)]
pub struct PipelineProgress {
    /// Current phase
    pub phase: PipelinePhase,

    /// Sections finished so far
    pub sections_processed: usize,

    /// Total sections, zero until extraction is done
    pub total_sections: usize,

    /// Current status message
    pub status: String,
}

impl PipelineProgress {
    /// Create a new progress indicator.
    pub fn new(phase: PipelinePhase, total_sections: usize) -> Self {
        Self {
            phase,
            sections_processed: 0,
            total_sections,
            status: String::new(),
        }
    }

    /// Update progress within the current phase.
    pub fn update(&mut self, sections_processed: usize, status: &str) {
        self.sections_processed = sections_processed;
        self.status = status.to_string();
    }

    /// Transition to next phase.
    pub fn next_phase(&mut self, phase: PipelinePhase) {
        self.phase = phase;
        self.status = format!("Starting {:?} phase", phase);
    }

    /// Overall progress (0.0 - 1.0).
    pub fn overall_progress(&self) -> f32 {
        match self.phase {
            PipelinePhase::Extraction => 0.0,
            PipelinePhase::Generation if self.total_sections == 0 => 0.1,
            PipelinePhase::Generation => {
                0.1 + 0.8 * (self.sections_processed as f32 / self.total_sections as f32)
            }
            PipelinePhase::Merging => 0.9,
        }
    }
}

/// A section left out because its plan could not be parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSection {
    /// Section id
    pub id: String,
    /// Section title
    pub title: String,
    /// Why the section was skipped
    pub reason: String,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Directory the artifacts were written to
    pub output_dir: PathBuf,

    /// Number of sections the document yielded
    pub section_count: usize,

    /// Per-section script files, in section order
    pub section_files: Vec<PathBuf>,

    /// Sections with no usable plan
    pub skipped_sections: Vec<SkippedSection>,

    /// Scene names found in the merged file
    pub scene_names: Vec<String>,

    /// Path of the merged file, when written
    pub combined_file: Option<PathBuf>,

    /// Why the document was abandoned, if it was
    pub abort_reason: Option<String>,

    /// Total duration of pipeline execution
    pub duration: Duration,
}

impl PipelineReport {
    /// Report for a document abandoned before any file was written.
    pub fn aborted(output_dir: &Path, reason: &str, duration: Duration) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            section_count: 0,
            section_files: Vec::new(),
            skipped_sections: Vec::new(),
            scene_names: Vec::new(),
            combined_file: None,
            abort_reason: Some(reason.to_string()),
            duration,
        }
    }

    /// Whether the document was abandoned.
    pub fn is_aborted(&self) -> bool {
        self.abort_reason.is_some()
    }

    /// Get a summary of the pipeline run.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("Duration: {:.2}s", self.duration.as_secs_f32())];

        if let Some(reason) = &self.abort_reason {
            parts.push(format!("Aborted: {}", reason));
            return parts.join(" | ");
        }

        parts.push(format!(
            "Sections: {} written of {}",
            self.section_files.len(),
            self.section_count
        ));
        if !self.skipped_sections.is_empty() {
            parts.push(format!("Skipped: {}", self.skipped_sections.len()));
        }
        parts.push(format!("Scenes: {}", self.scene_names.len()));

        parts.join(" | ")
    }
}

/// The main animation pipeline orchestrator.
#[derive(Debug)]
pub struct AnimationPipeline {
    config: PipelineConfig,
    sections_pass: SectionsPass,
    planning_pass: PlanningPass,
    codegen_pass: CodegenPass,
    merger: CodeMerger,
}

impl AnimationPipeline {
    /// Create a new pipeline with the given client and configuration.
    pub fn new(client: Arc<dyn LlmClient>, config: PipelineConfig) -> Self {
        let sections_pass = SectionsPass::new(Arc::clone(&client), &config.model, config.max_tokens);
        let planning_pass = PlanningPass::new(Arc::clone(&client), &config.model, config.max_tokens);
        let codegen_pass = CodegenPass::new(client, &config.model, config.max_tokens)
            .with_language(&config.code_language);
        let merger = CodeMerger::for_base_class(&config.scene_base_class);

        Self {
            config,
            sections_pass,
            planning_pass,
            codegen_pass,
            merger,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Plan one section and generate its code.
    ///
    /// Independent of every other section, so callers may schedule
    /// sections concurrently.
    pub async fn process_section(
        &self,
        section: &Section,
    ) -> std::result::Result<(AnimationPlan, GeneratedCode), StageError> {
        let plan = self.planning_pass.plan_section(section).await?;
        let code = self.codegen_pass.generate_code(&plan).await?;
        Ok((plan, code))
    }

    /// Run the whole pipeline for one document.
    pub async fn run(
        &self,
        document: &SourceDocument,
        output_dir: &Path,
        progress_callback: Option<Box<dyn Fn(PipelineProgress) + Send>>,
    ) -> Result<PipelineReport> {
        let start_time = Instant::now();
        let notify = |progress: &PipelineProgress| {
            if let Some(ref callback) = progress_callback {
                callback(progress.clone());
            }
        };

        // Phase 1: Extraction
        let mut progress = PipelineProgress::new(PipelinePhase::Extraction, 0);
        progress.update(0, "Extracting content and dividing into sections...");
        info!("{}", progress.status);
        notify(&progress);

        let sections = match self.sections_pass.extract_sections(document).await {
            Ok(sections) => sections,
            Err(StageError::MalformedResponse { reason, raw_content, .. }) => {
                error!("Error in content extraction: {}", reason);
                error!("Raw content:\n{}", raw_content);
                return Ok(PipelineReport::aborted(
                    output_dir,
                    &format!("content extraction failed: {}", reason),
                    start_time.elapsed(),
                ));
            }
            Err(e) => return Err(e).context("Content extraction failed"),
        };

        if sections.is_empty() {
            warn!("No sections found in the document.");
            return Ok(PipelineReport::aborted(
                output_dir,
                "no sections found",
                start_time.elapsed(),
            ));
        }

        let total = sections.len();
        info!("Found {} sections.", total);

        // Phase 2: Generation
        progress.total_sections = total;
        progress.next_phase(PipelinePhase::Generation);
        notify(&progress);

        FileManager::ensure_dir(output_dir)?;

        let mut plans: Vec<AnimationPlan> = Vec::with_capacity(total);
        let mut codes: Vec<GeneratedCode> = Vec::with_capacity(total);
        let mut section_files: Vec<PathBuf> = Vec::with_capacity(total);
        let mut skipped_sections = Vec::new();

        for (index, section) in sections.sections.iter().enumerate() {
            progress.update(
                index,
                &format!("Processing section {}/{}: {}", index + 1, total, section.title),
            );
            info!("{}", progress.status);
            notify(&progress);

            match self.process_section(section).await {
                Ok((plan, code)) => {
                    let path = FileManager::unique_path(
                        FileManager::section_script_path(output_dir, &section.title),
                        &section_files,
                    );
                    FileManager::write_to_file(&path, &code.source)?;
                    info!("  Saved to {}", path.display());

                    plans.push(plan);
                    codes.push(code);
                    section_files.push(path);
                }
                Err(StageError::MalformedResponse { stage, reason, raw_content }) => {
                    warn!(
                        "Skipping section '{}': {} stage returned no usable plan ({})",
                        section.title, stage, reason
                    );
                    debug!("Raw content:\n{}", raw_content);
                    skipped_sections.push(SkippedSection {
                        id: section.id.clone(),
                        title: section.title.clone(),
                        reason,
                    });
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Section '{}' failed", section.title));
                }
            }
        }

        progress.update(total, "All sections processed");
        notify(&progress);

        // Phase 3: Merging
        progress.next_phase(PipelinePhase::Merging);
        notify(&progress);

        FileManager::write_json(output_dir.join(SECTIONS_FILE), &sections)?;
        FileManager::write_json(output_dir.join(PLANS_FILE), &plans)?;

        let merged = self.merger.merge(&codes);
        let combined_path = output_dir.join(COMBINED_FILE);
        FileManager::write_to_file(&combined_path, &merged.render())
            .context("Failed to write combined animation")?;

        info!("Done! Results saved to {}", output_dir.display());
        info!("Combined animation saved to {}", combined_path.display());

        Ok(PipelineReport {
            output_dir: output_dir.to_path_buf(),
            section_count: total,
            section_files,
            skipped_sections,
            scene_names: merged.scene_names,
            combined_file: Some(combined_path),
            abort_reason: None,
            duration: start_time.elapsed(),
        })
    }
}
