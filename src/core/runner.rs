//! Sequential batch driver: names to candidates to probes to artifacts.

use crate::core::aggregator::{log_report_summary, Enrichment, ProfileAggregator};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::models::{
    AccountRecord, BatchResult, Candidate, NameTokens, ProbeOutcome, SkipReason,
};
use crate::core::pacing::Pacer;
use crate::core::probe::AccountProbe;
use crate::core::session::SessionManager;
use crate::services::Services;
use crate::utils::input::NameRow;
use crate::utils::names::normalize_name;
use crate::utils::output::{report_path, write_report, write_resolution};
use crate::utils::patterns::generate_candidates;

use indicatif::ProgressBar;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What happened to one input name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameOutcome {
    /// The name had no usable tokens.
    Malformed(String),
    /// The name had an unsupported number of tokens.
    Skipped(SkipReason),
    /// Every candidate was probed.
    Completed(BatchResult),
}

/// Result of probing a single address outside of a batch.
#[derive(Debug, Clone)]
pub struct Investigation {
    pub outcome: ProbeOutcome,
    pub enrichment: Option<Enrichment>,
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub names_total: usize,
    pub names_processed: usize,
    pub names_with_matches: usize,
    pub names_skipped: usize,
    pub names_failed: usize,
    pub candidates_probed: usize,
    pub addresses_resolved: usize,
    pub reports_written: usize,
}

impl RunSummary {
    pub fn log(&self, duration: Duration) {
        tracing::info!("-------------------- Run Summary --------------------");
        tracing::info!("Names in input               : {}", self.names_total);
        tracing::info!("Names processed              : {}", self.names_processed);
        tracing::info!("  - With resolved addresses  : {}", self.names_with_matches);
        tracing::info!("  - Skipped                  : {}", self.names_skipped);
        tracing::info!("  - Failed                   : {}", self.names_failed);
        tracing::info!("Candidates probed            : {}", self.candidates_probed);
        tracing::info!("Addresses resolved           : {}", self.addresses_resolved);
        tracing::info!("Reports written              : {}", self.reports_written);
        tracing::info!("Total time taken             : {:.2?}", duration);
        tracing::info!("-----------------------------------------------------");
    }
}

/// Drives candidates through the probe one at a time.
///
/// Owns the `SessionManager`; every probe attempt is followed by exactly one
/// pacing pause. Authentication failures abort the run, everything else only
/// affects the current candidate or name.
pub struct BatchRunner {
    config: Arc<Config>,
    sessions: SessionManager,
    probe: AccountProbe,
    aggregator: ProfileAggregator,
    pacer: Arc<dyn Pacer>,
    progress: ProgressBar,
    summary: RunSummary,
}

impl BatchRunner {
    pub fn new(config: Arc<Config>, services: &Services, pacer: Arc<dyn Pacer>) -> Self {
        Self {
            config,
            sessions: SessionManager::new(services.auth.clone()),
            probe: AccountProbe::new(services.lookup.clone()),
            aggregator: ProfileAggregator::new(services),
            pacer,
            progress: ProgressBar::hidden(),
            summary: RunSummary::default(),
        }
    }

    /// Reports progress on `progress` (one tick per input row).
    pub fn set_progress(&mut self, progress: ProgressBar) {
        self.progress = progress;
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Processes every row in order. Returns early only on fatal errors.
    pub async fn run(&mut self, rows: &[NameRow]) -> Result<RunSummary> {
        let start_time = Instant::now();
        self.summary = RunSummary {
            names_total: rows.len(),
            ..RunSummary::default()
        };
        self.progress.set_length(rows.len() as u64);

        self.sessions.ensure_session().await?;

        for row in rows {
            match self.process_name(&row.name).await {
                Ok(_) => {}
                Err(e) if e.is_fatal() => {
                    tracing::error!(target: "batch_runner", "Fatal error on record {}: {}", row.line, e);
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(target: "batch_runner", "Error processing name '{}': {}", row.name, e);
                    self.summary.names_failed += 1;
                }
            }
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        self.summary.log(start_time.elapsed());
        Ok(self.summary.clone())
    }

    /// Normalizes one display name, probes its candidates and records matches.
    pub async fn process_name(&mut self, raw_name: &str) -> Result<NameOutcome> {
        let tokens = match normalize_name(raw_name) {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(target: "batch_runner", "Skipping record: {}", e);
                self.summary.names_skipped += 1;
                return Ok(NameOutcome::Malformed(raw_name.to_string()));
            }
        };
        tracing::info!(target: "batch_runner", "Processing: {}", tokens);

        let candidates = match generate_candidates(&tokens, &self.config.email_domain) {
            Ok(candidates) => candidates,
            Err(reason) => {
                tracing::warn!(target: "batch_runner", "Skipping '{}': {}", tokens, reason);
                self.summary.names_skipped += 1;
                return Ok(NameOutcome::Skipped(reason));
            }
        };

        let result = self.process_candidates(&tokens, &candidates).await?;
        if result.has_matches() {
            write_resolution(&self.config.output_dir, &result)?;
            self.summary.names_with_matches += 1;
        }
        self.summary.names_processed += 1;
        Ok(NameOutcome::Completed(result))
    }

    /// Probes `candidates` in order and collects the addresses that resolved.
    pub async fn process_candidates(
        &mut self,
        tokens: &NameTokens,
        candidates: &[Candidate],
    ) -> Result<BatchResult> {
        let mut found = Vec::new();

        for (i, candidate) in candidates.iter().enumerate() {
            let label = format!("[{}/{}] {}", i + 1, candidates.len(), candidate);
            self.progress
                .set_message(format!("Checking {}...", candidate.address()));

            let session = self.sessions.ensure_session().await?;
            let outcome = self.probe.probe(candidate, session).await;
            self.summary.candidates_probed += 1;
            tracing::debug!(
                target: "batch_runner",
                address = candidate.address(),
                outcome = outcome.label(),
                "Probe finished"
            );

            match outcome {
                ProbeOutcome::Resolved(record) => {
                    tracing::info!(target: "batch_runner", "{} Found valid email", label);
                    found.push(candidate.address().to_string());
                    self.summary.addresses_resolved += 1;
                    if self.config.enrich {
                        let path = self
                            .config
                            .report_dir
                            .as_deref()
                            .map(|dir| report_path(dir, candidate.address()));
                        self.enrich(candidate.address(), record, path.as_deref())
                            .await?;
                    }
                }
                ProbeOutcome::NotFound => {
                    tracing::warn!(target: "batch_runner", "{} No account found", label);
                }
                ProbeOutcome::NoPublicProfile => {
                    tracing::warn!(target: "batch_runner", "{} No public profile found", label);
                }
                ProbeOutcome::TransientError(e) => {
                    tracing::error!(target: "batch_runner", "{} Failed to check: {}", label, e);
                    if e.is_session_expired() {
                        self.sessions.invalidate();
                    }
                }
            }

            self.pacer.pause().await;
        }

        Ok(BatchResult {
            name: tokens.full_name(),
            found,
        })
    }

    /// Probes one address and, when it resolves, builds its report.
    pub async fn investigate(
        &mut self,
        address: &str,
        json_path: Option<&Path>,
    ) -> Result<Investigation> {
        let address = address.trim().to_lowercase();
        let session = self.sessions.ensure_session().await?;
        let outcome = self.probe.probe_address(&address, session).await;

        let enrichment = match &outcome {
            ProbeOutcome::Resolved(record) => {
                self.enrich(&address, record.clone(), json_path).await?
            }
            ProbeOutcome::TransientError(e) if e.is_session_expired() => {
                self.sessions.invalidate();
                None
            }
            _ => None,
        };
        Ok(Investigation { outcome, enrichment })
    }

    async fn enrich(
        &mut self,
        address: &str,
        record: AccountRecord,
        json_path: Option<&Path>,
    ) -> Result<Option<Enrichment>> {
        let session = self.sessions.ensure_session().await?;
        let enrichment = match self.aggregator.build_report(address, record, session).await {
            Ok(enrichment) => enrichment,
            Err(e) => {
                tracing::warn!(target: "batch_runner", "Could not build report for {}: {}", address, e);
                return Ok(None);
            }
        };

        log_report_summary(&enrichment.report);
        if enrichment.session_expired() {
            self.sessions.invalidate();
        }

        if let Some(path) = json_path {
            match write_report(path, &enrichment.report) {
                Ok(()) => self.summary.reports_written += 1,
                Err(e) => {
                    tracing::error!(target: "batch_runner", "Failed to write report {}: {}", path.display(), e)
                }
            }
        }
        Ok(Some(enrichment))
    }

    /// Releases the session. Safe to call on every exit path, more than once.
    pub async fn shutdown(&mut self) {
        self.progress.finish_and_clear();
        self.sessions.close().await;
    }
}

/// Runs `rows` and releases the session whatever the outcome.
pub async fn run_and_release(runner: &mut BatchRunner, rows: &[NameRow]) -> Result<RunSummary> {
    let result = runner.run(rows).await;
    runner.shutdown().await;
    result
}
