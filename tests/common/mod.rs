/*!
 * Common test utilities for the manimgen test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use manimgen::animation::SourceDocument;
use manimgen::providers::LlmClient;
use manimgen::providers::mock::MockProvider;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Initializes env_logger once so `RUST_LOG=debug` shows library logs
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A small lecture handed to the pipeline as plain text
pub fn sample_document() -> SourceDocument {
    SourceDocument::from_bytes(
        "lecture.txt",
        "The mean of a sample is the sum of its values divided by their count.",
    )
}

/// A fake PDF, only the extension matters to the pipeline
pub fn sample_pdf() -> SourceDocument {
    SourceDocument::from_bytes("lecture.pdf", b"%PDF-1.4 fake".to_vec())
}

/// Scripted provider plus the same provider as a shared client
pub fn scripted_client(replies: Vec<String>) -> (MockProvider, Arc<dyn LlmClient>) {
    let provider = MockProvider::scripted(replies);
    let client: Arc<dyn LlmClient> = Arc::new(provider.clone());
    (provider, client)
}

/// Sections reply fencing `sections` as `{"sections": [...]}`
pub fn sections_reply(sections: &[(&str, &str)]) -> String {
    let items: Vec<String> = sections
        .iter()
        .map(|(id, title)| {
            format!(
                r#"{{"id": "{}", "title": "{}", "concepts": ["{} basics"], "formulas": [], "examples": []}}"#,
                id, title, title
            )
        })
        .collect();

    format!(
        "Here is the structure:\n```json\n{{\"sections\": [{}]}}\n```\n",
        items.join(", ")
    )
}

/// Plan reply with a single concept step
pub fn plan_reply(section_id: &str, title: &str) -> String {
    format!(
        "```json\n{{\"section_id\": \"{}\", \"section_title\": \"{}\", \"animations\": [{{\"type\": \"concept\", \"content\": \"{}\", \"steps\": [{{\"description\": \"Show the title\", \"action\": \"Write\"}}]}}]}}\n```",
        section_id, title, title
    )
}

/// Code reply declaring one scene
pub fn code_reply(scene: &str) -> String {
    format!(
        "```python\nfrom manimlib import *\n\nclass {}(Scene):\n    def construct(self):\n        self.play(Write(Text(\"{}\")))\n```",
        scene, scene
    )
}
