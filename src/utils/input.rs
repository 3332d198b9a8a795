//! Reads the list of display names from a CSV file.

use crate::core::error::{AppError, Result};
use std::path::Path;

/// One input row. `line` is the 1-based record number, header excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRow {
    pub line: u64,
    pub name: String,
}

/// Loads every value of `column` in file order.
///
/// A missing file, a missing column or an unreadable record are fatal.
pub fn load_names(path: &Path, column: &str) -> Result<Vec<NameRow>> {
    if !path.is_file() {
        return Err(AppError::InputNotFound(path.to_path_buf()));
    }
    tracing::debug!(target: "input", "Opening input file: {}", path.display());
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let index = headers.iter().position(|h| h == column).ok_or_else(|| {
        AppError::MalformedInput(format!("CSV file must contain a '{}' column", column))
    })?;

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let name = record.get(index).ok_or_else(|| {
            AppError::MalformedInput(format!("record {} has no '{}' field", i + 1, column))
        })?;
        rows.push(NameRow {
            line: i as u64 + 1,
            name: name.to_string(),
        });
    }
    tracing::debug!(target: "input", "Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}
