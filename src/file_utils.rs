use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;

// @module: File and directory utilities

// Anything outside [A-Za-z0-9_] and other Unicode word characters
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w]").unwrap());

/// Timestamp format used in rendered video names
pub const VIDEO_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Per-section script path inside an output directory
    // @params: output_dir, section title
    pub fn section_script_path<P: AsRef<Path>>(output_dir: P, title: &str) -> PathBuf {
        output_dir.as_ref().join(format!("{}.py", slugify(title)))
    }

    /// First path not in `taken`, adding `_2`, `_3`, ... to the file stem
    pub fn unique_path(path: PathBuf, taken: &[PathBuf]) -> PathBuf {
        if !taken.contains(&path) {
            return path;
        }

        let stem = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        let extension = path.extension().map(|e| e.to_string_lossy().to_string());
        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();

        (2..)
            .map(|k| {
                let name = match &extension {
                    Some(ext) => format!("{}_{}.{}", stem, k, ext),
                    None => format!("{}_{}", stem, k),
                };
                parent.join(name)
            })
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or(path)
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        Self::write_bytes(path, content.as_bytes())
    }

    /// Write raw bytes to a file, creating parent directories
    pub fn write_bytes<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Serialize a value as pretty-printed JSON into a file
    pub fn write_json<P: AsRef<Path>, T: serde::Serialize>(path: P, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize JSON for {:?}", path.as_ref()))?;
        Self::write_to_file(path, &json)
    }

    // @generates: `<stem>-<YYYYmmdd_HHMMSS>.<ext>`
    pub fn timestamped_name(stem: &str, extension: &str, at: DateTime<Local>) -> String {
        format!("{}-{}.{}", stem, at.format(VIDEO_TIMESTAMP_FORMAT), extension)
    }
}

/// File stem for a section title: non-word characters become `_`, then lowercase
pub fn slugify(title: &str) -> String {
    NON_WORD.replace_all(title, "_").to_lowercase()
}
