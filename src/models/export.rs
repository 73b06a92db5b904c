use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

use crate::models::AppState;

/// Top-level collections every import file must carry
pub const REQUIRED_FIELDS: [&str; 4] = ["links", "categories", "bundles", "activities"];

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
        }
    }
}

/// Why an import file was refused. The current state is never touched when
/// one of these is returned.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Failed to parse file: {0}")]
    Parse(String),

    #[error("Invalid data structure. Missing required field `{0}`.")]
    MissingField(&'static str),

    #[error("Invalid data structure. Field `{0}` must be an array.")]
    NotAnArray(&'static str),

    #[error("Invalid data structure: {0}")]
    Shape(#[from] serde_json::Error),
}

/// File name offered for a backup taken on `date`
pub fn default_export_file_name(date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "bundle-backup-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Serialize the state in the requested format
pub fn render_export(state: &AppState, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => {
            serde_json::to_string_pretty(state).context("Failed to serialize state to JSON")
        }
        ExportFormat::Yaml => {
            serde_yaml::to_string(state).context("Failed to serialize state to YAML")
        }
    }
}

/// Export the whole state to a file
pub fn export_to_file(state: &AppState, path: &Path, format: ExportFormat) -> Result<()> {
    let content = render_export(state, format)?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write export file {}", path.display()))
}

/// Parse and validate the contents of an import file.
///
/// JSON is tried first, then YAML. The four collections must be present and
/// arrays before the typed parse is attempted, so the error names the
/// offending field.
pub fn parse_import(contents: &str) -> Result<AppState, ValidationError> {
    let value: Value = match serde_json::from_str(contents) {
        Ok(value) => value,
        Err(json_err) => serde_yaml::from_str(contents)
            .map_err(|_| ValidationError::Parse(json_err.to_string()))?,
    };

    validate_shape(&value)?;
    Ok(serde_json::from_value(value)?)
}

fn validate_shape(value: &Value) -> Result<(), ValidationError> {
    for field in REQUIRED_FIELDS {
        match value.get(field) {
            None | Some(Value::Null) => return Err(ValidationError::MissingField(field)),
            Some(Value::Array(_)) => {}
            Some(_) => return Err(ValidationError::NotAnArray(field)),
        }
    }
    Ok(())
}

/// Read an import file from disk and validate it
pub fn import_from_file(path: &Path) -> Result<AppState> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file {}", path.display()))?;
    parse_import(&contents)
        .with_context(|| format!("Rejected import file {}", path.display()))
}
