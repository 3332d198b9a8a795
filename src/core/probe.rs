//! Classifies one candidate address against the account-lookup service.

use crate::core::error::ServiceError;
use crate::core::models::{Candidate, Container, ProbeOutcome};
use crate::services::{AccountLookup, Session};
use std::sync::Arc;

/// Performs lookups and maps every answer to exactly one `ProbeOutcome`.
#[derive(Clone)]
pub struct AccountProbe {
    lookup: Arc<dyn AccountLookup>,
}

impl AccountProbe {
    pub fn new(lookup: Arc<dyn AccountLookup>) -> Self {
        Self { lookup }
    }

    /// Looks up `candidate` with `session`. Never fails: transport and protocol
    /// problems become `ProbeOutcome::TransientError`.
    pub async fn probe(&self, candidate: &Candidate, session: &Session) -> ProbeOutcome {
        self.probe_address(candidate.address(), session).await
    }

    pub async fn probe_address(&self, address: &str, session: &Session) -> ProbeOutcome {
        let task_label = format!("[Probe: {}]", address);
        tracing::debug!(target: "account_probe", "{} Issuing lookup", task_label);

        let response = match self.lookup.lookup(address, session).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(target: "account_probe", "{} Lookup failed: {}", task_label, e);
                return ProbeOutcome::TransientError(e);
            }
        };

        if !response.found {
            return ProbeOutcome::NotFound;
        }

        let Some(record) = response.person else {
            return ProbeOutcome::TransientError(ServiceError::Protocol(
                "lookup reported a match without an account record".to_string(),
            ));
        };

        if record.containers.len() > 1 || !record.has_container(&Container::Profile) {
            let names: Vec<&str> = record.containers.keys().map(|c| c.as_str()).collect();
            tracing::info!(target: "account_probe", "{} Account visible in containers: {}", task_label, names.join(", "));
        }

        if !record.has_container(&Container::Profile) {
            return ProbeOutcome::NoPublicProfile;
        }

        tracing::debug!(target: "account_probe", "{} Resolved to account {}", task_label, record.account_id);
        ProbeOutcome::Resolved(record)
    }
}
