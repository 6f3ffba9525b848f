//! Load a table from a JSON file holding an array of records

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use super::TableView;
use crate::format::format_date;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Expected a JSON array of records")]
    NotAnArray,

    #[error("Record {index} is not a JSON object")]
    NotAnObject { index: usize },
}

/// Read `path` and build a table. Columns named in `date_columns` are
/// rendered through [`format_date`].
pub fn load_json(path: &Path, date_columns: &[String]) -> Result<TableView, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let table = parse_records(&content, date_columns)?;
    tracing::debug!("Loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Parse JSON text into a table
pub fn parse_records(content: &str, date_columns: &[String]) -> Result<TableView, LoadError> {
    let value: Value = serde_json::from_str(content)?;
    let records = match value {
        Value::Array(records) => records,
        _ => return Err(LoadError::NotAnArray),
    };

    let mut objects = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match record {
            Value::Object(map) => objects.push(map),
            _ => return Err(LoadError::NotAnObject { index }),
        }
    }

    // Headers in first-seen order across all records
    let mut headers: Vec<String> = Vec::new();
    for map in &objects {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = objects
        .iter()
        .map(|map| {
            headers
                .iter()
                .map(|h| {
                    let text = map.get(h).map(cell_text).unwrap_or_default();
                    if date_columns.contains(h) {
                        format_date(Some(text.as_str()))
                    } else {
                        text
                    }
                })
                .collect()
        })
        .collect();

    Ok(TableView::new(headers, rows))
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
