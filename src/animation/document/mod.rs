/*!
 * Document modeling for the animation pipeline.
 *
 * This module provides the types exchanged between pipeline stages:
 * - Source documents read from disk
 * - Sections extracted from a document
 * - Animation plans and generated code per section
 */

pub mod model;

// Re-export types used by other modules
pub use model::{
    AnimationKind, AnimationPlan, AnimationStep, Formula, GeneratedCode, Section,
    SectionsDocument, SourceDocument, SubStep, PDF_MEDIA_TYPE,
};
