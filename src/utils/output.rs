//! Writes resolution files and JSON reports.

use crate::core::error::Result;
use crate::core::models::{BatchResult, EnrichedReport};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        tracing::debug!(target: "output", "Creating output directory: {}", dir.display());
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Path of the resolution file for `name` inside `dir`.
pub fn resolution_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.txt", name))
}

/// Writes one resolved address per line to `<dir>/<name>.txt`, replacing any previous file.
pub fn write_resolution(dir: &Path, result: &BatchResult) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = resolution_path(dir, &result.name);
    let mut writer = BufWriter::new(File::create(&path)?);
    for address in &result.found {
        writeln!(writer, "{}", address)?;
    }
    writer.flush()?;
    tracing::info!(target: "output", "Wrote {} address(es) to {}", result.found.len(), path.display());
    Ok(path)
}

/// Path of the JSON report for `address` inside `dir`.
pub fn report_path(dir: &Path, address: &str) -> PathBuf {
    dir.join(format!("{}.json", address))
}

/// Serializes `report` as pretty JSON to `path`.
pub fn write_report(path: &Path, report: &EnrichedReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = report.to_json_pretty()?;
    fs::write(path, json)?;
    tracing::info!(target: "output", "JSON report written to {}", path.display());
    Ok(())
}
