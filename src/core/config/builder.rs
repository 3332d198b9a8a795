//! Provides the `ConfigBuilder` for fluent configuration construction.

use super::loading::{apply_file_config, load_config_file};
use super::validation::validate_config;
use super::{Config, ConfigFile, Result};
use crate::AppError;
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_FILES: [&str; 2] = ["./ruit.toml", "./config.toml"];

/// Builder pattern for creating `Config` instances fluently.
///
/// Loads an optional TOML file, applies explicit overrides on top, then validates.
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
    config_file_path: Option<String>,
    overrides: ConfigFile,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify an optional configuration file path to load.
    pub fn config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file_path = Some(path.into());
        self
    }

    pub fn service_url(mut self, url: impl Into<String>) -> Self {
        self.overrides.service.url = Some(url.into());
        self
    }
    pub fn credentials_path(mut self, path: impl Into<String>) -> Self {
        self.overrides.service.credentials_path = Some(path.into());
        self
    }
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.overrides.service.request_timeout = Some(duration.as_secs());
        self
    }
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.overrides.service.user_agent = Some(value.into());
        self
    }
    pub fn pacing_interval(mut self, duration: Duration) -> Self {
        self.overrides.pacing.interval = Some(duration.as_secs());
        self
    }
    pub fn email_domain(mut self, domain: impl Into<String>) -> Self {
        self.overrides.candidates.domain = Some(domain.into());
        self
    }
    pub fn name_column(mut self, column: impl Into<String>) -> Self {
        self.overrides.input.name_column = Some(column.into());
        self
    }
    pub fn output_dir(mut self, dir: impl Into<String>) -> Self {
        self.overrides.output.dir = Some(dir.into());
        self
    }
    pub fn report_dir(mut self, dir: impl Into<String>) -> Self {
        self.overrides.output.report_dir = Some(dir.into());
        self
    }
    pub fn enrich(mut self, enable: bool) -> Self {
        self.overrides.output.enrich = Some(enable);
        self
    }

    /// Layers defaults, the config file and the explicit overrides, then validates.
    ///
    /// Without an explicit file, the first of `DEFAULT_CONFIG_FILES` that exists is
    /// used. A file that exists but cannot be parsed is an error either way.
    pub fn build(mut self) -> Result<Config> {
        let source = self.config_file_path.take().or_else(|| {
            DEFAULT_CONFIG_FILES
                .iter()
                .find(|candidate| Path::new(candidate).is_file())
                .map(|found| found.to_string())
        });

        match source {
            Some(path) => {
                let file_config = load_config_file(&path).map_err(|e| {
                    AppError::Config(format!("Cannot use configuration file '{}': {:#}", path, e))
                })?;
                apply_file_config(&mut self.config, &file_config);
                tracing::info!("Loaded configuration from {}", path);
                self.config.loaded_config_path = Some(path);
            }
            None => tracing::debug!("No configuration file; using defaults and overrides."),
        }

        apply_file_config(&mut self.config, &self.overrides);
        validate_config(&mut self.config)?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_overrides_win_over_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ruit.toml");
        std::fs::write(
            &path,
            "[pacing]\ninterval = 60\n[candidates]\ndomain = \"example.org\"\n",
        )
        .unwrap();

        let config = ConfigBuilder::new()
            .config_file(path.to_str().unwrap())
            .pacing_interval(Duration::from_secs(15))
            .build()
            .unwrap();

        assert_eq!(config.pacing_interval, Duration::from_secs(15));
        assert_eq!(config.email_domain, "example.org");
        assert_eq!(config.loaded_config_path.as_deref(), path.to_str());
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let result = ConfigBuilder::new()
            .config_file("/no/such/ruit.toml")
            .build();
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_builder_setters() {
        let config = ConfigBuilder::new()
            .service_url("https://bridge.example.net")
            .credentials_path("/tmp/creds.json")
            .name_column("Full Name")
            .output_dir("out")
            .report_dir("reports")
            .enrich(false)
            .build()
            .unwrap();
        assert_eq!(config.service_url, "https://bridge.example.net");
        assert_eq!(config.credentials_path, PathBuf::from("/tmp/creds.json"));
        assert_eq!(config.name_column, "Full Name");
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.report_dir, Some(PathBuf::from("reports")));
        assert!(!config.enrich);
    }

    #[test]
    fn test_unparsable_file_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ruit.toml");
        std::fs::write(&path, "[pacing\ninterval = ").unwrap();
        let result = ConfigBuilder::new()
            .config_file(path.to_str().unwrap())
            .build();
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let result = ConfigBuilder::new().email_domain("nodot").build();
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
