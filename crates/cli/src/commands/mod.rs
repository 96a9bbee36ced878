pub mod catalog;
pub mod dictionary;
pub mod parse;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use smeta_core::MatchDictionary;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

impl CommandResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn failure(exit_code: u8, message: impl Into<String>) -> Self {
        Self { exit_code, output: format!("error: {}", message.into()) }
    }
}

/// Built-in tables, with the TOML file overlaid when given.
fn load_dictionary(path: Option<&Path>) -> Result<MatchDictionary> {
    match path {
        Some(path) => MatchDictionary::from_path(path).context("loading dictionary"),
        None => Ok(MatchDictionary::default()),
    }
}

fn load_rows(demo: bool, catalog_path: Option<&Path>) -> Result<Vec<HashMap<String, String>>> {
    if demo {
        return Ok(smeta_core::demo_rows());
    }
    let Some(path) = catalog_path else {
        bail!("either --demo or --catalog <file> is required");
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading catalog from {}", path.display()))?;
    rows_from_json(&raw).with_context(|| format!("parsing catalog from {}", path.display()))
}

/// Catalog files are JSON arrays of flat objects, one per row. Non-string
/// cells are stringified; null cells become empty strings so the key still
/// counts for column detection.
fn rows_from_json(raw: &str) -> Result<Vec<HashMap<String, String>>> {
    let rows: Vec<serde_json::Map<String, Value>> =
        serde_json::from_str(raw).context("expected a JSON array of objects")?;

    Ok(rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(key, value)| {
                    let cell = match value {
                        Value::Null => String::new(),
                        Value::String(text) => text,
                        other => other.to_string(),
                    };
                    (key, cell)
                })
                .collect()
        })
        .collect())
}
