//! Runtime configuration: defaults, the TOML file schema and the builder.

mod builder;
mod loading;
mod validation;

pub use builder::ConfigBuilder;

pub(crate) use crate::core::error::Result;

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8787";
pub const DEFAULT_EMAIL_DOMAIN: &str = "gmail.com";
pub const DEFAULT_PACING_SECS: u64 = 120;

/// Effective configuration used by the resolver.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the lookup bridge.
    pub service_url: String,
    /// File holding the stored session token.
    pub credentials_path: PathBuf,
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Fixed delay applied after every probe attempt.
    pub pacing_interval: Duration,
    /// Domain appended to every generated candidate.
    pub email_domain: String,
    /// CSV column holding the display name.
    pub name_column: String,
    /// Directory receiving one resolution file per name with matches.
    pub output_dir: PathBuf,
    /// Directory receiving one JSON report per resolved account, if set.
    pub report_dir: Option<PathBuf>,
    /// Whether resolved accounts are enriched with sub-service data.
    pub enrich: bool,
    pub loaded_config_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            credentials_path: PathBuf::from("credentials.json"),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("ruit/{}", env!("CARGO_PKG_VERSION")),
            pacing_interval: Duration::from_secs(DEFAULT_PACING_SECS),
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            name_column: "Name".to_string(),
            output_dir: PathBuf::from("found_emails"),
            report_dir: None,
            enrich: true,
            loaded_config_path: None,
        }
    }
}

/// Delay to wait after a probe attempt. Fixed, never adaptive.
pub fn pacing_delay(config: &Config) -> Duration {
    config.pacing_interval
}

/// On-disk configuration layout. Every field is optional and overrides the default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub service: ServiceSection,
    pub pacing: PacingSection,
    pub candidates: CandidatesSection,
    pub input: InputSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceSection {
    pub url: Option<String>,
    pub credentials_path: Option<String>,
    /// Seconds.
    pub request_timeout: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PacingSection {
    /// Seconds.
    pub interval: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CandidatesSection {
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InputSection {
    pub name_column: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub dir: Option<String>,
    pub report_dir: Option<String>,
    pub enrich: Option<bool>,
}
