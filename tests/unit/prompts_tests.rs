/*!
 * Tests for prompt templates
 */

use manimgen::animation::prompts::{
    SECTIONS_INSTRUCTION, codegen_prompt, generation_prompt, planning_prompt,
};
use manimgen::animation::{AnimationKind, AnimationPlan, AnimationStep, Section};

#[test]
fn test_sectionsInstruction_shouldDescribeJsonShape() {
    assert!(SECTIONS_INSTRUCTION.starts_with("Analyze the content of this PDF."));
    assert!(SECTIONS_INSTRUCTION.contains(r#"{"sections": [{"id": "unique_id""#));
}

#[test]
fn test_planningPrompt_shouldNameSectionInReplyShape() {
    let section = Section::new("intro", "Introduction");

    let prompt = planning_prompt(&section);

    assert!(prompt.contains(r#""section_id": "intro""#));
    assert!(prompt.contains(r#""section_title": "Introduction""#));
    assert!(!prompt.contains("{section_id}"));
    assert!(!prompt.contains("{section_title}"));
}

#[test]
fn test_codegenPrompt_shouldEmbedPlanAndManimLibRules() {
    let mut plan = AnimationPlan::for_section(&Section::new("s1", "Mean"));
    plan.animations.push(AnimationStep {
        kind: AnimationKind::Formula,
        content: "Definition of the mean".to_string(),
        latex: Some(r"\bar{x}".to_string()),
        steps: Vec::new(),
        ..Default::default()
    });

    let prompt = codegen_prompt(&plan);

    assert!(prompt.contains(&serde_json::to_string(&plan).unwrap()));
    assert!(prompt.contains(r#""type":"formula""#));
    assert!(prompt.contains("from manimlib import *"));
    assert!(!prompt.contains("{plan_json}"));
}

#[test]
fn test_generationPrompt_withoutExtras_shouldBeTrimmedQuery() {
    assert_eq!(generation_prompt("  Draw a sine wave \n", false, None), "Draw a sine wave");
}

#[test]
fn test_generationPrompt_withPdfAndSceneName_shouldAppendBoth() {
    let prompt = generation_prompt("Draw a sine wave", true, Some("Sine"));

    assert_eq!(
        prompt,
        "Draw a sine wave\n\nThe scene MUST have a name Sine.\n\nUse the attached PDF document as context for the animation."
    );
}
