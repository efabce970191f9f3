/*!
 * Tests for fenced block extraction
 */

use manimgen::animation::SectionsDocument;
use manimgen::animation::extract::{extract_code_blocks, extract_fenced, extract_json};
use manimgen::errors::ExtractionError;

#[test]
fn test_extractFenced_withSurroundingProse_shouldReturnOnlyPayload() {
    let reply = "Sure! Here you go:\n```json\n  {\"sections\": []}  \n```\nLet me know if you need more.";

    assert_eq!(extract_fenced(reply, "json").unwrap(), "{\"sections\": []}");
}

#[test]
fn test_extractFenced_withTwoBlocks_shouldReturnFirst() {
    let reply = "```json\n{\"a\": 1}\n```\nand\n```json\n{\"b\": 2}\n```";

    assert_eq!(extract_fenced(reply, "json").unwrap(), "{\"a\": 1}");
}

#[test]
fn test_extractFenced_withUntaggedFence_shouldReturnNotFound() {
    let reply = "```\n{\"sections\": []}\n```";

    let error = extract_fenced(reply, "json").unwrap_err();
    assert_eq!(error, ExtractionError::NotFound { format: "json".to_string() });
}

#[test]
fn test_extractFenced_withUnterminatedFence_shouldReturnNotFound() {
    let reply = "```json\n{\"sections\": []}";

    assert!(matches!(extract_fenced(reply, "json"), Err(ExtractionError::NotFound { .. })));
}

#[test]
fn test_extractJson_withValidSections_shouldDeserialize() {
    let reply = "```json\n{\"sections\": [{\"id\": 3, \"title\": \"Variance\"}]}\n```";

    let document: SectionsDocument = extract_json(reply).unwrap();
    assert_eq!(document.sections.len(), 1);
    assert_eq!(document.sections[0].id, "3");
    assert_eq!(document.sections[0].title, "Variance");
    assert!(document.sections[0].is_empty());
}

#[test]
fn test_extractJson_withTruncatedPayload_shouldKeepPayloadInError() {
    let reply = "```json\n{\"sections\": [\n```";

    match extract_json::<SectionsDocument>(reply) {
        Err(ExtractionError::Malformed { format, payload, .. }) => {
            assert_eq!(format, "json");
            assert_eq!(payload, "{\"sections\": [");
        }
        other => panic!("expected Malformed, got {:?}", other),
    }
}

#[test]
fn test_extractCodeBlocks_shouldIgnoreOtherLanguages() {
    let reply = "```python\na = 1\n```\n```json\n{}\n```\n```python\nb = 2\n```";

    assert_eq!(extract_code_blocks(reply, "python"), vec!["a = 1", "b = 2"]);
    assert_eq!(extract_code_blocks(reply, "json"), vec!["{}"]);
}

#[test]
fn test_extractCodeBlocks_withRegexCharactersInTag_shouldMatchLiterally() {
    let reply = "```c++\nint x;\n```\n```cxx\nint y;\n```";

    assert_eq!(extract_code_blocks(reply, "c++"), vec!["int x;"]);
}
