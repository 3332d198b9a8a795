//! # Ruit Core Library
//!
//! Turns person names into likely account addresses, probes each one against
//! a lookup service at a fixed pace and, for the addresses that resolve,
//! builds a public-profile report from the gaming, maps and calendar
//! sub-services.
//!
//! It is designed to be used either directly as a library or via the `ruit`
//! command-line tool (which uses this library).

mod core;
mod services;
mod utils;

pub use crate::core::aggregator::{
    log_report_summary, Enrichment, ProfileAggregator, Section, SectionFailure,
};
pub use crate::core::config::{Config, ConfigBuilder, ConfigFile};
pub use crate::core::error::{AppError, AuthenticationError, Result, ServiceError};
pub use crate::core::models::{
    AccountId, AccountRecord, BatchResult, Candidate, Container, ContainerRecord, EnrichedReport,
    NameTokens, ProbeOutcome, SkipReason, Template,
};
pub use crate::core::pacing::{FixedPacer, Pacer};
pub use crate::core::probe::AccountProbe;
pub use crate::core::runner::{run_and_release, BatchRunner, Investigation, NameOutcome, RunSummary};
pub use crate::core::session::SessionManager;
pub use crate::services::http::HttpGateway;
pub use crate::services::{
    AccountLookup, Authenticator, CalendarService, GamesService, MapsService, Services, Session,
};
pub use crate::utils::input::{load_names, NameRow};
pub use crate::utils::knowledge::user_type_definition;
pub use crate::utils::names::normalize_name;
pub use crate::utils::output::{report_path, write_report, write_resolution};
pub use crate::utils::patterns::generate_candidates;

use std::sync::Arc;

/// Builds a `BatchRunner` wired to the HTTP gateway described by `config`,
/// pacing with the configured fixed interval.
pub fn initialize_runner(config: Arc<Config>) -> Result<BatchRunner> {
    let gateway = Arc::new(HttpGateway::new(&config)?);
    let services = Services::from_gateway(gateway);
    let pacer = Arc::new(FixedPacer::from_config(&config));
    Ok(BatchRunner::new(config, &services, pacer))
}

/// Generates the candidate addresses for one display name.
///
/// Returns an empty list for names that normalize to nothing or have an
/// unsupported number of parts.
pub fn candidates_for(raw_name: &str, domain: &str) -> Vec<Candidate> {
    normalize_name(raw_name)
        .ok()
        .and_then(|tokens| generate_candidates(&tokens, domain).ok())
        .unwrap_or_default()
}
