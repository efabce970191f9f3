/*!
 * Core data model for the section pipeline.
 *
 * These types mirror the JSON shapes exchanged with the model and the
 * artifacts persisted to the output directory.
 */

use anyhow::{Context, Result};
use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::providers::Prompt;

/// MIME type used for PDF attachments.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// An input document, read once and attached to a prompt.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Where the document was read from
    pub path: PathBuf,

    /// MIME type derived from the file extension
    pub media_type: String,

    /// Raw file contents
    pub data: Bytes,
}

impl SourceDocument {
    /// Read a document from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read document: {:?}", path))?;

        Ok(Self::from_bytes(path, data))
    }

    /// Wrap bytes that are already in memory.
    pub fn from_bytes<P: AsRef<Path>>(path: P, data: impl Into<Bytes>) -> Self {
        let path = path.as_ref().to_path_buf();
        let media_type = match path.extension().map(|e| e.to_string_lossy().to_lowercase()) {
            Some(ext) if ext == "pdf" => PDF_MEDIA_TYPE.to_string(),
            _ => "text/plain".to_string(),
        };

        Self {
            path,
            media_type,
            data: data.into(),
        }
    }

    /// Whether the document is sent as a binary PDF block.
    pub fn is_pdf(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE
    }

    /// Append this document to a prompt.
    ///
    /// PDFs become a document block; anything else is inlined as text.
    pub fn attach(&self, prompt: Prompt) -> Prompt {
        if self.is_pdf() {
            prompt.document(self.media_type.clone(), self.data.clone())
        } else {
            prompt.text(String::from_utf8_lossy(&self.data).into_owned())
        }
    }
}

/// A formula with its LaTeX markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Formula {
    /// What the formula expresses
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,

    /// LaTeX source
    #[serde(default, deserialize_with = "lenient_string")]
    pub latex: String,

    /// Keys the model added beyond the known ones, kept as they came
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Formula {
    /// Create a formula from its description and LaTeX source.
    pub fn new(description: &str, latex: &str) -> Self {
        Self {
            description: description.to_string(),
            latex: latex.to_string(),
            extra: Map::new(),
        }
    }
}

/// A logical subdivision of the source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Section {
    /// Identifier, unique within a `SectionsDocument`
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,

    /// Human-readable title
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,

    /// Main concepts, in order. Usually strings, any JSON value is kept.
    #[serde(default, deserialize_with = "lenient_list")]
    pub concepts: Vec<Value>,

    /// Formulas, in order
    #[serde(default, deserialize_with = "lenient_formulas")]
    pub formulas: Vec<Formula>,

    /// Worked examples, in order. Usually strings, any JSON value is kept.
    #[serde(default, deserialize_with = "lenient_list")]
    pub examples: Vec<Value>,

    /// Keys the model added beyond the known ones, kept as they came
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Section {
    /// Create an empty section.
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    /// True when the section carries no concepts, formulas, or examples.
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty() && self.formulas.is_empty() && self.examples.is_empty()
    }
}

/// The structured result of the content-to-sections stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SectionsDocument {
    /// All sections, in document order
    #[serde(default)]
    pub sections: Vec<Section>,

    /// Top-level keys other than `sections`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SectionsDocument {
    /// Fill in blank ids/titles and make ids unique.
    ///
    /// Blank ids become `section_<n>` and blank titles `Section <n>` (1-based).
    /// A repeated id gets a `_<k>` suffix, starting at 2.
    pub fn normalize(&mut self) {
        let mut seen: HashSet<String> = HashSet::new();

        for (index, section) in self.sections.iter_mut().enumerate() {
            if section.id.trim().is_empty() {
                section.id = format!("section_{}", index + 1);
            }
            if section.title.trim().is_empty() {
                section.title = format!("Section {}", index + 1);
            }

            if seen.contains(&section.id) {
                let base = section.id.clone();
                let mut suffix = 2;
                while seen.contains(&format!("{}_{}", base, suffix)) {
                    suffix += 1;
                }
                section.id = format!("{}_{}", base, suffix);
            }
            seen.insert(section.id.clone());
        }
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether no section was found.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Kind of an animation step. Open set: unknown kinds are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnimationKind {
    Formula,
    Concept,
    Example,
    Other(String),
}

impl From<String> for AnimationKind {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "formula" => Self::Formula,
            "concept" => Self::Concept,
            "example" => Self::Example,
            _ => Self::Other(value),
        }
    }
}

impl From<AnimationKind> for String {
    fn from(kind: AnimationKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Formula => write!(f, "formula"),
            Self::Concept => write!(f, "concept"),
            Self::Example => write!(f, "example"),
            Self::Other(kind) => write!(f, "{}", kind),
        }
    }
}

impl Default for AnimationKind {
    fn default() -> Self {
        Self::Concept
    }
}

/// One sub-step of an animation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SubStep {
    /// What happens on screen
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,

    /// Animation verb (Write, Transform, ...)
    #[serde(default, deserialize_with = "lenient_string")]
    pub action: String,

    /// Keys the model added beyond the known ones, kept as they came
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One presentation step of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnimationStep {
    /// Step kind
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: AnimationKind,

    /// What to display
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,

    /// LaTeX markup, when the step shows a formula
    #[serde(default, deserialize_with = "lenient_optional_string", skip_serializing_if = "Option::is_none")]
    pub latex: Option<String>,

    /// Sub-steps, in order
    #[serde(default, deserialize_with = "lenient_sub_steps")]
    pub steps: Vec<SubStep>,

    /// Keys the model added beyond the known ones, kept as they came
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The animation plan for one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnimationPlan {
    /// Id of the planned section
    #[serde(default, deserialize_with = "lenient_string")]
    pub section_id: String,

    /// Title of the planned section
    #[serde(default, deserialize_with = "lenient_string")]
    pub section_title: String,

    /// Steps in presentation order
    #[serde(default, deserialize_with = "lenient_list")]
    pub animations: Vec<AnimationStep>,

    /// Keys the model added beyond the known ones, kept as they came
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnimationPlan {
    /// Create an empty plan for a section.
    pub fn for_section(section: &Section) -> Self {
        Self {
            section_id: section.id.clone(),
            section_title: section.title.clone(),
            animations: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Total number of sub-steps across all animations.
    pub fn sub_step_count(&self) -> usize {
        self.animations.iter().map(|a| a.steps.len()).sum()
    }
}

/// Source code produced for one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCode {
    /// Id of the section the code belongs to
    pub section_id: String,

    /// Title of the section the code belongs to
    pub section_title: String,

    /// Scene definitions plus their imports
    pub source: String,
}

impl AsRef<str> for GeneratedCode {
    fn as_ref(&self) -> &str {
        &self.source
    }
}

/// Read a string field that models sometimes emit as a number, `null` or an object.
///
/// Strings are kept, `null` becomes empty and anything else keeps its JSON text.
fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(value_to_string)
}

fn lenient_optional_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        other => Some(value_to_string(other)),
    })
}

fn lenient_kind<'de, D>(deserializer: D) -> std::result::Result<AnimationKind, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => AnimationKind::default(),
        other => AnimationKind::from(value_to_string(other)),
    })
}

/// A list that may come as `null` or as a single bare item.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        single => vec![single],
    };

    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(serde::de::Error::custom))
        .collect()
}

/// Formulas given as bare strings are taken as their LaTeX source.
fn lenient_formulas<'de, D>(deserializer: D) -> std::result::Result<Vec<Formula>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Vec<Value> = lenient_list(deserializer)?;

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(_) => serde_json::from_value(item).map_err(serde::de::Error::custom),
            other => Ok(Formula::new("", &value_to_string(other))),
        })
        .collect()
}

/// Sub-steps given as bare strings are taken as their description.
fn lenient_sub_steps<'de, D>(deserializer: D) -> std::result::Result<Vec<SubStep>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Vec<Value> = lenient_list(deserializer)?;

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(_) => serde_json::from_value(item).map_err(serde::de::Error::custom),
            other => Ok(SubStep {
                description: value_to_string(other),
                ..Default::default()
            }),
        })
        .collect()
}
