//! Text helpers and input parsing for the pypic application

use crate::error::{PypicError, Result};
use crate::types::{BatchEntry, BatchInput, SearchResult};
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, error, info};

static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("valid separator pattern"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Canonical form of a package name: runs of `-`, `_` and `.` become a single
/// `-` and the result is lowercased.
pub fn normalize(name: &str) -> String {
    SEPARATOR_RUN.replace_all(name, "-").to_lowercase()
}

/// Normalize a dynamically typed name, rejecting anything that is not a string
pub fn normalize_value(value: &Value) -> Result<String> {
    match value {
        Value::String(name) => Ok(normalize(name)),
        other => Err(PypicError::invalid_type("string", json_type_name(other))),
    }
}

/// Replace every run of whitespace with a single space
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").into_owned()
}

/// Build the `terms` query value from search keywords
pub fn search_terms<S: AsRef<str>>(keywords: &[S]) -> String {
    keywords
        .iter()
        .map(|k| k.as_ref())
        .collect::<Vec<_>>()
        .join("+")
        .replace(' ', "+")
}

fn json_type_name(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(n) if n.is_f64() => format!("float ({})", n),
        Value::Number(n) => format!("integer ({})", n),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

/// Parse JSON input for batch existence checks.
///
/// Accepts either an array of names or an object mapping names to a version
/// (`null` or `"latest"` meaning any version).
pub fn parse_batch_input(json: &str) -> Result<BatchInput> {
    debug!("Parsing batch input: {}", json);

    let value: Value = serde_json::from_str(json).map_err(|e| {
        error!("Failed to parse JSON: {}", e);
        PypicError::JsonError(e)
    })?;

    let entries = match &value {
        Value::Array(names) => names
            .iter()
            .map(|name| batch_entry(name, None))
            .collect::<Result<Vec<_>>>()?,
        Value::Object(map) => map
            .iter()
            .map(|(name, version)| {
                let version = match version {
                    Value::Null => None,
                    Value::String(v) if v == "latest" => None,
                    Value::String(v) => Some(v.clone()),
                    other => {
                        return Err(PypicError::invalid_type("string", json_type_name(other)))
                    }
                };
                batch_entry(&Value::String(name.clone()), version)
            })
            .collect::<Result<Vec<_>>>()?,
        other => {
            return Err(PypicError::validation(format!(
                "Expected a JSON array of names or an object of name/version pairs, found {}",
                json_type_name(other)
            )))
        }
    };

    if entries.is_empty() {
        return Err(PypicError::validation("Batch input cannot be empty"));
    }

    info!("Parsed batch input with {} entries", entries.len());
    Ok(BatchInput { entries })
}

fn batch_entry(name: &Value, version: Option<String>) -> Result<BatchEntry> {
    let normalized_name = normalize_value(name)?;
    if normalized_name.is_empty() {
        return Err(PypicError::validation("Package name cannot be empty"));
    }

    Ok(BatchEntry {
        name: name.as_str().unwrap_or(&normalized_name).to_string(),
        normalized_name,
        version,
    })
}

/// Parse batch input from a file
pub fn parse_batch_file<P: AsRef<Path>>(path: P) -> Result<BatchInput> {
    let path = path.as_ref();
    info!("Reading batch file: {}", path.display());

    let content = fs::read_to_string(path).map_err(|e| {
        error!("Failed to read file {}: {}", path.display(), e);
        PypicError::IoError(e)
    })?;

    parse_batch_input(&content)
}

/// Example batch inputs for help output
pub fn create_example_batch_inputs() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Package list", r#"["requests", "Flask", "zope.interface"]"#),
        (
            "Package version map",
            r#"{"requests": "2.31.0", "pypic": "0.1.0", "flask": null}"#,
        ),
    ]
}

/// One aligned text row for a search hit: name right-aligned, then version,
/// weight and description.
pub fn format_result_line(result: &SearchResult) -> String {
    let weight = result.weight.map(|w| w.to_string()).unwrap_or_default();
    format!(
        "{:>14} {:<5} {:>4} {:<20}",
        result.name.as_deref().unwrap_or(""),
        result.version.as_deref().unwrap_or(""),
        weight,
        result.desc.as_deref().unwrap_or("")
    )
}

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Parse a timeout string (e.g., "30s", "2m", "1h")
pub fn parse_timeout(input: &str) -> Result<std::time::Duration> {
    let input = input.trim().to_lowercase();

    if let Ok(secs) = input.parse::<u64>() {
        return Ok(std::time::Duration::from_secs(secs));
    }

    let multiplier = match input.chars().last() {
        Some('s') => 1,
        Some('m') => 60,
        Some('h') => 3600,
        _ => 0,
    };

    if multiplier > 0 {
        if let Ok(n) = input[..input.len() - 1].parse::<u64>() {
            return Ok(std::time::Duration::from_secs(n * multiplier));
        }
    }

    Err(PypicError::ValidationError(format!(
        "Invalid timeout format: '{}'. Use formats like '30s', '5m', '1h'",
        input
    )))
}
