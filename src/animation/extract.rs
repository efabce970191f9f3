/*!
 * Fenced-block extraction from free-form model output.
 *
 * Models wrap structured payloads in markdown fences. The helpers here pull
 * those payloads out without ever panicking on unexpected text.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::errors::ExtractionError;

// The tag must not continue as a longer one: ```python never matches ```python3
static JSON_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json((?:[^\w+#-].*?)?)```").unwrap());
static PYTHON_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```python((?:[^\w+#-].*?)?)```").unwrap());

fn fence_pattern(format: &str) -> Option<Regex> {
    Regex::new(&format!(r"(?s)```{}((?:[^\w+#-].*?)?)```", regex::escape(format))).ok()
}

/// Run `f` against the fence pattern for `format`; `None` if none can be built.
fn with_pattern<R>(format: &str, f: impl FnOnce(&Regex) -> R) -> Option<R> {
    match format {
        "json" => Some(f(&JSON_BLOCK)),
        "python" => Some(f(&PYTHON_BLOCK)),
        other => fence_pattern(other).map(|re| f(&re)),
    }
}

/// Return the trimmed payload of the first block fenced as ```` ```<format> ````.
pub fn extract_fenced<'a>(text: &'a str, format: &str) -> Result<&'a str, ExtractionError> {
    with_pattern(format, |re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
    })
    .flatten()
    .ok_or_else(|| ExtractionError::NotFound {
        format: format.to_string(),
    })
}

/// Extract the first ```` ```json ```` block and deserialize it.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T, ExtractionError> {
    let payload = extract_fenced(text, "json")?;

    serde_json::from_str(payload).map_err(|e| ExtractionError::Malformed {
        format: "json".to_string(),
        reason: e.to_string(),
        payload: payload.to_string(),
    })
}

/// Every block fenced with the given language, trimmed, in order of appearance.
pub fn extract_code_blocks<'a>(text: &'a str, language: &str) -> Vec<&'a str> {
    with_pattern(language, |re| {
        re.captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .collect()
    })
    .unwrap_or_default()
}
