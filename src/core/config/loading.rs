//! Handles loading configuration from files and applying it to the Config struct.

use super::{Config, ConfigFile};
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Loads configuration settings from a TOML file.
pub(crate) fn load_config_file(file_path: &str) -> anyhow::Result<ConfigFile> {
    let path = Path::new(file_path);
    if !path.is_file() {
        return Err(anyhow::anyhow!(
            "File not found or is not a file: {}",
            file_path
        ));
    }
    tracing::debug!("Attempting to read config file: {}", file_path);
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", file_path))?;

    let config_file_content: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML configuration from {}", file_path))?;

    tracing::debug!("Successfully parsed configuration file: {}", file_path);
    Ok(config_file_content)
}

/// Merges the settings present in `file_config` onto `config`.
pub(crate) fn apply_file_config(config: &mut Config, file_config: &ConfigFile) {
    // Service
    if let Some(ref url) = file_config.service.url {
        config.service_url = url.trim().to_string();
    }
    if let Some(ref path) = file_config.service.credentials_path {
        config.credentials_path = PathBuf::from(path);
    }
    if let Some(timeout) = file_config.service.request_timeout {
        config.request_timeout = Duration::from_secs(timeout);
    }
    if let Some(ref user_agent) = file_config.service.user_agent {
        config.user_agent = user_agent.clone();
    }

    // Pacing
    if let Some(interval) = file_config.pacing.interval {
        config.pacing_interval = Duration::from_secs(interval);
    }

    // Candidates
    if let Some(ref domain) = file_config.candidates.domain {
        config.email_domain = domain.trim().trim_start_matches('@').to_lowercase();
    }

    // Input
    if let Some(ref column) = file_config.input.name_column {
        config.name_column = column.trim().to_string();
    }

    // Output
    if let Some(ref dir) = file_config.output.dir {
        config.output_dir = PathBuf::from(dir);
    }
    if let Some(ref dir) = file_config.output.report_dir {
        if dir.trim().is_empty() {
            config.report_dir = None;
        } else {
            config.report_dir = Some(PathBuf::from(dir.trim()));
        }
    }
    if let Some(enrich) = file_config.output.enrich {
        config.enrich = enrich;
    }
}
