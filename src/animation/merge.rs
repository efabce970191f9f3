/*!
 * Merging of per-section scene code into one file.
 *
 * Import lines are pooled and deduplicated, scene definitions are collected
 * in order, and a commented-out driver block lists every scene found.
 * Finding scene definitions is delegated to a [`SceneExtractor`], so the
 * regex heuristic can be swapped for a real parser without touching the
 * merger.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default base class a scene must derive from.
pub const DEFAULT_SCENE_BASE: &str = "Scene";

// A line that opens any class, indented or not
static CLASS_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*class\s+\w+").unwrap());

/// One named scene definition, captured verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDefinition {
    /// Class name, when it could be recovered
    pub name: Option<String>,

    /// Source text of the class
    pub source: String,
}

/// Strategy for locating scene definitions in generated source.
pub trait SceneExtractor {
    /// Return every scene definition in `source`, in order of appearance.
    fn extract(&self, source: &str) -> Vec<SceneDefinition>;
}

/// Regex-based extractor matching `class <Name>(<base_class>):`.
///
/// A definition runs until the next line that opens a class, or to the end
/// of the text. Classes with a different base are not scenes and are only
/// used as boundaries.
#[derive(Debug, Clone)]
pub struct RegexSceneExtractor {
    base_class: String,
    header: Option<Regex>,
    name: Option<Regex>,
}

impl RegexSceneExtractor {
    /// Create an extractor for scenes deriving from `base_class`.
    pub fn new(base_class: impl Into<String>) -> Self {
        let base_class = base_class.into();
        let escaped = regex::escape(&base_class);

        Self {
            header: Regex::new(&format!(r"class\s+\w+\({}\):", escaped)).ok(),
            name: Regex::new(&format!(r"class\s+(\w+)\({}\)", escaped)).ok(),
            base_class,
        }
    }

    /// The base class this extractor matches.
    pub fn base_class(&self) -> &str {
        &self.base_class
    }

    fn scene_name(&self, body: &str) -> Option<String> {
        self.name
            .as_ref()?
            .captures(body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl Default for RegexSceneExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_SCENE_BASE)
    }
}

impl SceneExtractor for RegexSceneExtractor {
    fn extract(&self, source: &str) -> Vec<SceneDefinition> {
        let Some(header) = &self.header else {
            return Vec::new();
        };

        let mut scenes = Vec::new();
        let mut consumed = 0;

        for found in header.find_iter(source) {
            if found.start() < consumed {
                continue;
            }

            let end = CLASS_LINE
                .find_at(source, found.end())
                .map(|m| m.start())
                .unwrap_or(source.len());

            let body = source[found.start()..end].trim_end();
            scenes.push(SceneDefinition {
                name: self.scene_name(body),
                source: body.to_string(),
            });
            consumed = end;
        }

        scenes
    }
}

/// The merged file before rendering.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MergedArtifact {
    /// Unique import lines, first occurrence order
    pub imports: Vec<String>,

    /// Scene definitions in blob order, then match order
    pub scenes: Vec<SceneDefinition>,

    /// Unique scene names in discovery order
    pub scene_names: Vec<String>,
}

impl MergedArtifact {
    /// Render the merged file as text.
    pub fn render(&self) -> String {
        let definitions: Vec<&str> = self.scenes.iter().map(|s| s.source.as_str()).collect();

        let mut output = format!("{}\n\n{}", self.imports.join("\n"), definitions.join("\n\n"));

        if !self.scene_names.is_empty() {
            output.push_str("\n\nif __name__ == \"__main__\":\n");
            output.push_str("    # To run all scenes sequentially, uncomment this block\n");
            output.push_str("    # import sys\n");
            output.push_str("    # from os import path\n");
            output.push_str("    # sys.path.append(path.dirname(path.dirname(path.abspath(__file__))))\n");
            for name in &self.scene_names {
                output.push_str(&format!("    # {}().render()\n", name));
            }
        }

        output
    }
}

/// Merges generated code blobs using a pluggable scene extractor.
#[derive(Debug, Clone)]
pub struct CodeMerger<E: SceneExtractor = RegexSceneExtractor> {
    extractor: E,
}

impl CodeMerger<RegexSceneExtractor> {
    /// Merger matching scenes derived from `Scene`.
    pub fn new() -> Self {
        Self::with_extractor(RegexSceneExtractor::default())
    }

    /// Merger matching scenes derived from `base_class`.
    pub fn for_base_class(base_class: impl Into<String>) -> Self {
        Self::with_extractor(RegexSceneExtractor::new(base_class))
    }
}

impl Default for CodeMerger<RegexSceneExtractor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SceneExtractor> CodeMerger<E> {
    /// Merger with a custom extraction strategy.
    pub fn with_extractor(extractor: E) -> Self {
        Self { extractor }
    }

    /// Merge blobs in the order given.
    pub fn merge<S: AsRef<str>>(&self, blobs: &[S]) -> MergedArtifact {
        let mut artifact = MergedArtifact::default();
        let mut seen_imports = HashSet::new();
        let mut seen_names = HashSet::new();

        for blob in blobs {
            let blob = blob.as_ref();

            for line in blob.lines() {
                if is_import_line(line) && seen_imports.insert(line.to_string()) {
                    artifact.imports.push(line.to_string());
                }
            }

            for scene in self.extractor.extract(blob) {
                if let Some(name) = &scene.name {
                    if seen_names.insert(name.clone()) {
                        artifact.scene_names.push(name.clone());
                    }
                }
                artifact.scenes.push(scene);
            }
        }

        artifact
    }

    /// Merge and render in one step.
    pub fn merge_to_string<S: AsRef<str>>(&self, blobs: &[S]) -> String {
        self.merge(blobs).render()
    }
}

/// Whether a line is an import statement.
pub fn is_import_line(line: &str) -> bool {
    line.starts_with("import ") || line.starts_with("from ")
}
