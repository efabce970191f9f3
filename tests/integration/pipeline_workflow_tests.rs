/*!
 * Integration tests for the section pipeline.
 *
 * Every run uses a scripted mock provider, so the replies of the sections,
 * planning and code stages are fully controlled.
 */

use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;

use manimgen::animation::pipeline::PipelinePhase;
use manimgen::animation::pipeline::orchestrator::{COMBINED_FILE, PLANS_FILE, SECTIONS_FILE};
use manimgen::animation::{AnimationPipeline, AnimationPlan, PipelineConfig, PipelineProgress, SectionsDocument};
use manimgen::providers::PromptPart;
use crate::common;

fn pipeline(client: Arc<dyn manimgen::providers::LlmClient>) -> AnimationPipeline {
    AnimationPipeline::new(client, PipelineConfig::default().with_model("claude-test"))
}

#[tokio::test]
async fn test_run_withTwoSections_shouldWriteAllArtifacts() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("out");

    let (provider, client) = common::scripted_client(vec![
        common::sections_reply(&[("s1", "Mean"), ("s2", "Variance & Spread")]),
        common::plan_reply("s1", "Mean"),
        common::code_reply("Mean"),
        common::plan_reply("s2", "Variance & Spread"),
        common::code_reply("Variance"),
    ]);

    let report = pipeline(client).run(&common::sample_pdf(), &output_dir, None).await?;

    assert!(!report.is_aborted());
    assert_eq!(report.section_count, 2);
    assert_eq!(
        report.section_files,
        vec![output_dir.join("mean.py"), output_dir.join("variance___spread.py")]
    );
    assert!(report.skipped_sections.is_empty());
    assert_eq!(report.scene_names, vec!["Mean", "Variance"]);
    assert_eq!(report.combined_file, Some(output_dir.join(COMBINED_FILE)));

    let mean = std::fs::read_to_string(output_dir.join("mean.py"))?;
    assert!(mean.starts_with("from manimlib import *\n\nclass Mean(Scene):"));

    let sections: SectionsDocument =
        serde_json::from_str(&std::fs::read_to_string(output_dir.join(SECTIONS_FILE))?)?;
    assert_eq!(sections.len(), 2);
    assert_eq!(sections.sections[1].title, "Variance & Spread");

    let plans: Vec<AnimationPlan> =
        serde_json::from_str(&std::fs::read_to_string(output_dir.join(PLANS_FILE))?)?;
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0].section_id, "s1");
    assert_eq!(plans[1].sub_step_count(), 1);

    let combined = std::fs::read_to_string(output_dir.join(COMBINED_FILE))?;
    assert_eq!(combined.matches("from manimlib import *").count(), 1);
    assert!(combined.find("class Mean(Scene)") < combined.find("class Variance(Scene)"));
    assert!(combined.contains("    # Mean().render()\n    # Variance().render()\n"));

    // One sections request, then plan and code per section
    assert_eq!(provider.request_count(), 5);
    assert_eq!(provider.remaining_replies(), 0);

    let requests = provider.requests();
    assert!(matches!(
        &requests[0].parts[0],
        PromptPart::Document { media_type, .. } if media_type == "application/pdf"
    ));
    assert!(requests.iter().all(|r| r.model == "claude-test"));
    assert!(requests[1].user_text().contains(r#""section_id": "s1""#));
    assert!(!requests[1].has_document());

    Ok(())
}

#[tokio::test]
async fn test_run_withMalformedSectionsReply_shouldAbortWithoutWriting() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("out");

    let (provider, client) = common::scripted_client(vec![
        "I'm sorry, I could not read this document.".to_string(),
    ]);

    let report = pipeline(client).run(&common::sample_document(), &output_dir, None).await?;

    assert!(report.is_aborted());
    assert!(report.abort_reason.as_deref().unwrap_or_default().contains("content extraction failed"));
    assert!(report.combined_file.is_none());
    assert!(!output_dir.exists());
    assert_eq!(provider.request_count(), 1);

    Ok(())
}

#[tokio::test]
async fn test_run_withInvalidSectionsJson_shouldAbortWithoutWriting() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("out");

    let (_, client) = common::scripted_client(vec!["```json\n{\"sections\": [{\"id\": }]}\n```".to_string()]);

    let report = pipeline(client).run(&common::sample_document(), &output_dir, None).await?;

    assert!(report.is_aborted());
    assert!(!output_dir.exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withNoSections_shouldAbort() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("out");

    let (_, client) = common::scripted_client(vec!["```json\n{\"sections\": []}\n```".to_string()]);

    let report = pipeline(client).run(&common::sample_document(), &output_dir, None).await?;

    assert_eq!(report.abort_reason.as_deref(), Some("no sections found"));
    assert!(!output_dir.exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withMalformedPlan_shouldSkipSectionAndContinue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("out");

    let (provider, client) = common::scripted_client(vec![
        common::sections_reply(&[("s1", "Mean"), ("s2", "Median")]),
        "This section is too abstract to animate.".to_string(),
        common::plan_reply("s2", "Median"),
        common::code_reply("Median"),
    ]);

    let report = pipeline(client).run(&common::sample_document(), &output_dir, None).await?;

    assert!(!report.is_aborted());
    assert_eq!(report.section_count, 2);
    assert_eq!(report.section_files, vec![output_dir.join("median.py")]);
    assert_eq!(report.skipped_sections.len(), 1);
    assert_eq!(report.skipped_sections[0].id, "s1");
    assert_eq!(report.scene_names, vec!["Median"]);
    assert!(!output_dir.join("mean.py").exists());

    let plans: Vec<AnimationPlan> =
        serde_json::from_str(&std::fs::read_to_string(output_dir.join(PLANS_FILE))?)?;
    assert_eq!(plans.len(), 1);

    // No code request is made for the skipped section
    assert_eq!(provider.request_count(), 4);
    Ok(())
}

#[tokio::test]
async fn test_run_withCodeReplyWithoutFence_shouldKeepReplyVerbatim() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("out");
    let raw_code = "from manimlib import *\n\nclass Mode(Scene):\n    pass";

    let (_, client) = common::scripted_client(vec![
        common::sections_reply(&[("s1", "Mode")]),
        common::plan_reply("s1", "Mode"),
        raw_code.to_string(),
    ]);

    let report = pipeline(client).run(&common::sample_document(), &output_dir, None).await?;

    assert_eq!(std::fs::read_to_string(output_dir.join("mode.py"))?, raw_code);
    assert_eq!(report.scene_names, vec!["Mode"]);
    Ok(())
}

#[tokio::test]
async fn test_run_withDuplicateTitles_shouldNotOverwriteSectionFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("out");

    let (_, client) = common::scripted_client(vec![
        common::sections_reply(&[("a", "Mean"), ("b", "Mean")]),
        common::plan_reply("a", "Mean"),
        common::code_reply("MeanOne"),
        common::plan_reply("b", "Mean"),
        common::code_reply("MeanTwo"),
    ]);

    let report = pipeline(client).run(&common::sample_document(), &output_dir, None).await?;

    assert_eq!(
        report.section_files,
        vec![output_dir.join("mean.py"), output_dir.join("mean_2.py")]
    );
    assert!(std::fs::read_to_string(output_dir.join("mean_2.py"))?.contains("class MeanTwo(Scene)"));
    Ok(())
}

#[tokio::test]
async fn test_run_withTransportFault_shouldReturnError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("out");

    // The script runs out after the sections reply, so planning fails in transport
    let (_, client) = common::scripted_client(vec![common::sections_reply(&[("s1", "Mean")])]);

    let result = pipeline(client).run(&common::sample_document(), &output_dir, None).await;

    let error = result.unwrap_err();
    assert!(format!("{:#}", error).contains("Mock script exhausted"));
    assert!(!output_dir.join(COMBINED_FILE).exists());
    Ok(())
}

#[tokio::test]
async fn test_run_shouldReportProgressThroughEveryPhase() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("out");

    let (_, client) = common::scripted_client(vec![
        common::sections_reply(&[("s1", "Mean")]),
        common::plan_reply("s1", "Mean"),
        common::code_reply("Mean"),
    ]);

    let seen: Arc<Mutex<Vec<PipelineProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let callback: Box<dyn Fn(PipelineProgress) + Send> =
        Box::new(move |progress: PipelineProgress| sink.lock().push(progress));

    pipeline(client).run(&common::sample_document(), &output_dir, Some(callback)).await?;

    let seen = seen.lock();
    assert_eq!(seen.first().map(|p| p.phase), Some(PipelinePhase::Extraction));
    assert_eq!(seen.last().map(|p| p.phase), Some(PipelinePhase::Merging));
    assert!(seen
        .iter()
        .any(|p| p.phase == PipelinePhase::Generation && p.total_sections == 1 && p.sections_processed == 1));
    Ok(())
}

#[tokio::test]
async fn test_processSection_shouldReturnPlanAndCode() -> Result<()> {
    let (_, client) = common::scripted_client(vec![
        common::plan_reply("s1", "Mean"),
        common::code_reply("Mean"),
    ]);

    let section = manimgen::animation::Section::new("s1", "Mean");
    let (plan, code) = pipeline(client).process_section(&section).await?;

    assert_eq!(plan.section_title, "Mean");
    assert_eq!(code.section_id, "s1");
    assert!(code.source.contains("class Mean(Scene)"));
    Ok(())
}

#[tokio::test]
async fn test_run_withUnknownKeys_shouldCarryThemToPromptsAndArtifacts() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("out");

    let sections = r#"```json
{"sections": [{"id": "s1", "title": "Mean", "concepts": ["average"], "key_points": ["sum over count"]}]}
```"#;
    let plan = r#"```json
{"section_id": "s1", "section_title": "Mean", "animations": [{"type": "concept", "content": "Mean", "duration": 4,
 "steps": [{"description": "Show the title", "action": "Write", "color": "YELLOW"}]}]}
```"#;

    let (provider, client) = common::scripted_client(vec![
        sections.to_string(),
        plan.to_string(),
        common::code_reply("Mean"),
    ]);

    let report = pipeline(client).run(&common::sample_document(), &output_dir, None).await?;
    assert!(!report.is_aborted());

    let persisted: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_dir.join(SECTIONS_FILE))?)?;
    assert_eq!(persisted["sections"][0]["key_points"][0], "sum over count");

    let plans: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_dir.join(PLANS_FILE))?)?;
    assert_eq!(plans[0]["animations"][0]["duration"], 4);
    assert_eq!(plans[0]["animations"][0]["steps"][0]["color"], "YELLOW");

    let requests = provider.requests();
    assert!(requests[1].user_text().contains(r#""key_points":["sum over count"]"#));
    assert!(requests[2].user_text().contains(r#""color":"YELLOW""#));
    Ok(())
}

#[tokio::test]
async fn test_run_withObjectExamplesAndNullLatex_shouldProcessSection() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_dir = temp_dir.path().join("out");

    let sections = r#"```json
{"sections": [{"id": 1, "title": "Mean",
  "examples": [{"problem": "mean of 2 and 4", "answer": 3}],
  "formulas": [{"description": "sample mean", "latex": null}]}]}
```"#;

    let (provider, client) = common::scripted_client(vec![
        sections.to_string(),
        common::plan_reply("1", "Mean"),
        common::code_reply("Mean"),
    ]);

    let report = pipeline(client).run(&common::sample_document(), &output_dir, None).await?;

    assert!(!report.is_aborted());
    assert_eq!(report.section_files, vec![output_dir.join("mean.py")]);

    let persisted: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_dir.join(SECTIONS_FILE))?)?;
    assert_eq!(persisted["sections"][0]["id"], "1");
    assert_eq!(persisted["sections"][0]["examples"][0]["answer"], 3);
    assert_eq!(persisted["sections"][0]["formulas"][0]["description"], "sample mean");

    assert!(provider.requests()[1].user_text().contains(r#""problem":"mean of 2 and 4""#));
    Ok(())
}
