//! Contains validation logic for the final Config struct.

use super::{Config, Result};
use crate::core::error::AppError;
use crate::utils::patterns::EMAIL_REGEX;
use std::time::Duration;
use url::Url;

const MIN_SAFE_PACING: Duration = Duration::from_secs(10);

/// Validates the configuration after loading and overrides.
/// Rejects unusable values and warns about risky ones.
pub(crate) fn validate_config(config: &mut Config) -> Result<()> {
    let domain = config.email_domain.trim().to_lowercase();
    if !EMAIL_REGEX.is_match(&format!("a@{}", domain)) {
        return Err(AppError::Config(format!(
            "Invalid candidate email domain: '{}'",
            config.email_domain
        )));
    }
    config.email_domain = domain;

    match Url::parse(&config.service_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => {
            return Err(AppError::Config(format!(
                "Unsupported service URL scheme '{}' in {}",
                url.scheme(),
                config.service_url
            )));
        }
        Err(e) => {
            return Err(AppError::Config(format!(
                "Invalid service URL '{}': {}",
                config.service_url, e
            )));
        }
    }

    if config.name_column.trim().is_empty() {
        return Err(AppError::Config(
            "Name column cannot be empty.".to_string(),
        ));
    }

    if config.request_timeout.is_zero() {
        tracing::warn!("Request timeout was set to 0. Setting to 1s.");
        config.request_timeout = Duration::from_secs(1);
    }

    if config.pacing_interval < MIN_SAFE_PACING {
        tracing::warn!(
            "Pacing interval ({:.0?}) is below {:.0?}. The lookup service may throttle or ban the session.",
            config.pacing_interval,
            MIN_SAFE_PACING
        );
    }

    if !config.enrich && config.report_dir.is_some() {
        tracing::warn!("A report directory was provided, but enrichment is disabled. No reports will be written.");
    }
    Ok(())
}
