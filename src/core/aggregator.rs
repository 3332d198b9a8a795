//! Builds an enriched report for one resolved account.
//!
//! The gaming, maps and calendar sub-queries are independent of each other
//! and run together; a sub-service with no data leaves its section empty.

use crate::core::error::{AppError, Result, ServiceError};
use crate::core::models::{
    AccountRecord, CalendarSection, Container, EnrichedReport, MapsSection, PlayerProfile,
};
use crate::services::{CalendarService, GamesService, MapsService, Services, Session};
use crate::utils::knowledge::user_type_definition;
use std::fmt;
use std::sync::Arc;

/// Optional report sections backed by a sub-service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    PlayGames,
    Maps,
    Calendar,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::PlayGames => write!(f, "play_games"),
            Section::Maps => write!(f, "maps"),
            Section::Calendar => write!(f, "calendar"),
        }
    }
}

/// A sub-query that failed; its section stays empty in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFailure {
    pub section: Section,
    pub error: ServiceError,
}

#[derive(Debug, Clone)]
pub struct Enrichment {
    pub report: EnrichedReport,
    pub failures: Vec<SectionFailure>,
}

impl Enrichment {
    /// True when a sub-service reported the session as closed.
    pub fn session_expired(&self) -> bool {
        self.failures.iter().any(|f| f.error.is_session_expired())
    }
}

#[derive(Clone)]
pub struct ProfileAggregator {
    games: Arc<dyn GamesService>,
    maps: Arc<dyn MapsService>,
    calendar: Arc<dyn CalendarService>,
}

impl ProfileAggregator {
    pub fn new(services: &Services) -> Self {
        Self {
            games: services.games.clone(),
            maps: services.maps.clone(),
            calendar: services.calendar.clone(),
        }
    }

    /// Queries every sub-service for `record` and merges the answers.
    ///
    /// Fails only when the account has no profile container.
    pub async fn build_report(
        &self,
        address: &str,
        record: AccountRecord,
        session: &Session,
    ) -> Result<Enrichment> {
        if !record.has_container(&Container::Profile) {
            let names: Vec<&str> = record.containers.keys().map(|c| c.as_str()).collect();
            return Err(AppError::NoPublicProfile(format!(
                "{} (containers: {})",
                record.account_id,
                names.join(", ")
            )));
        }
        if record.containers.len() > 1 {
            for container in record.container_names() {
                tracing::info!(target: "aggregator", "Account {} is visible in container {}", record.account_id, container);
            }
        }

        let (play_games, maps, calendar) = tokio::join!(
            self.play_games(address, session),
            self.maps(&record),
            self.calendar(address, session),
        );

        let mut failures = Vec::new();
        let play_games = settle(Section::PlayGames, play_games, &mut failures).flatten();
        let maps = settle(Section::Maps, maps, &mut failures).unwrap_or_default();
        let calendar = settle(Section::Calendar, calendar, &mut failures).flatten();

        let report = EnrichedReport {
            address: address.to_string(),
            container: Container::Profile,
            account: record,
            play_games,
            maps,
            calendar,
        };
        Ok(Enrichment { report, failures })
    }

    async fn play_games(
        &self,
        address: &str,
        session: &Session,
    ) -> std::result::Result<Option<PlayerProfile>, ServiceError> {
        let players = self.games.search_player(address, session).await?;
        let Some(candidate) = players.first() else {
            tracing::debug!(target: "aggregator", "No player profile found for {}", address);
            return Ok(None);
        };
        tracing::debug!(target: "aggregator", "Found player candidate {} ({})", candidate.name, candidate.id);
        let profile = self.games.get_player(&candidate.id, session).await?;
        Ok(Some(profile))
    }

    async fn maps(
        &self,
        record: &AccountRecord,
    ) -> std::result::Result<MapsSection, ServiceError> {
        let response = self.maps.get_reviews(&record.account_id).await?;
        if let Some(ref reason) = response.error {
            tracing::debug!(target: "aggregator", "No maps data for {}: {}", record.account_id, reason);
        }
        Ok(MapsSection {
            photos: response.photos,
            reviews: response.reviews,
            stats: response.stats,
        })
    }

    async fn calendar(
        &self,
        address: &str,
        session: &Session,
    ) -> std::result::Result<Option<CalendarSection>, ServiceError> {
        let response = self.calendar.fetch_all(address, session).await?;
        if !response.found {
            return Ok(None);
        }
        Ok(Some(CalendarSection {
            details: response.calendar,
            events: response.events,
        }))
    }
}

fn settle<T>(
    section: Section,
    result: std::result::Result<T, ServiceError>,
    failures: &mut Vec<SectionFailure>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(target: "aggregator", "Could not fetch {} data: {}", section, error);
            failures.push(SectionFailure { section, error });
            None
        }
    }
}

/// Logs the highlights of a report.
pub fn log_report_summary(report: &EnrichedReport) {
    let account = &report.account;
    let profile = account.profile().cloned().unwrap_or_default();

    tracing::info!(target: "aggregator", "--- Account data for {} ---", report.address);
    match profile.profile_photo {
        Some(ref photo) if !photo.is_default => {
            tracing::info!(target: "aggregator", "Custom profile picture: {}", photo.url)
        }
        _ => tracing::info!(target: "aggregator", "Default profile picture"),
    }
    match profile.cover_photo {
        Some(ref photo) if !photo.is_default => {
            tracing::info!(target: "aggregator", "Custom cover picture: {}", photo.url)
        }
        _ => tracing::info!(target: "aggregator", "Default cover picture"),
    }
    if let Some(updated) = profile.last_updated {
        tracing::info!(target: "aggregator", "Last profile edit: {}", updated.format("%Y/%m/%d %H:%M:%S (UTC)"));
    }
    if let Some(ref name) = profile.display_name {
        tracing::info!(target: "aggregator", "Name: {}", name);
    }
    tracing::info!(target: "aggregator", "Email: {}", profile.email.as_deref().unwrap_or(&report.address));
    tracing::info!(target: "aggregator", "Account ID: {}", account.account_id);
    for user_type in &profile.user_types {
        tracing::info!(target: "aggregator", "User type: {} ({})", user_type, user_type_definition(user_type));
    }

    let chat = &account.extended.chat;
    tracing::info!(target: "aggregator", "Chat entity type: {}", chat.entity_type.as_deref().unwrap_or("Unknown"));
    tracing::info!(target: "aggregator", "Customer ID: {}", chat.customer_id.as_deref().unwrap_or("Not found"));
    tracing::info!(target: "aggregator", "Enterprise user: {}", account.extended.plus.is_enterprise_user);
    if !profile.reachable_apps.is_empty() {
        tracing::info!(target: "aggregator", "Activated services: {}", profile.reachable_apps.join(", "));
    }

    match report.play_games {
        Some(ref player) => tracing::info!(target: "aggregator",
            "Player profile: {} (ID: {}, level: {})",
            player.name,
            player.id,
            player.level.map(|l| l.to_string()).unwrap_or_else(|| "?".to_string())
        ),
        None => tracing::info!(target: "aggregator", "No player profile found."),
    }

    match (&report.maps.stats, &report.maps.reviews, &report.maps.photos) {
        (None, None, None) => tracing::info!(target: "aggregator", "No maps data."),
        (stats, reviews, photos) => tracing::info!(target: "aggregator",
            "Maps: {} stat entries, {} reviews, {} photos",
            stats.as_ref().map_or(0, |s| s.len()),
            reviews.as_ref().map_or(0, |r| r.len()),
            photos.as_ref().map_or(0, |p| p.len())
        ),
    }

    match report.calendar {
        Some(ref calendar) => {
            let events = calendar.events.as_ref().map_or(0, |e| e.items.len());
            if events == 0 {
                tracing::info!(target: "aggregator", "Public calendar found. No recent events found.");
            } else {
                tracing::info!(target: "aggregator", "Public calendar found with {} recent events.", events);
            }
        }
        None => tracing::info!(target: "aggregator", "No public calendar."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{
        CalendarDetails, CalendarEvent, CalendarEvents, CalendarResponse, MapsResponse,
        PlayerSummary,
    };
    use crate::services::mock::{account, MockCalendar, MockGames, MockMaps, MockServices};
    use std::collections::BTreeMap;

    const ADDRESS: &str = "jean.dupont@gmail.com";

    fn player(id: &str) -> PlayerProfile {
        PlayerProfile {
            id: id.to_string(),
            name: "jeanplays".to_string(),
            avatar_url: None,
            title: None,
            level: Some(12),
            experience_points: None,
            played_games: vec![],
        }
    }

    fn aggregator(mocks: &MockServices) -> ProfileAggregator {
        ProfileAggregator::new(&mocks.services())
    }

    #[tokio::test]
    async fn test_all_sections_empty_is_not_an_error() {
        let mocks = MockServices::new();
        let record = account("42", &[Container::Profile]);
        let enrichment = aggregator(&mocks)
            .build_report(ADDRESS, record.clone(), &Session::new("t"))
            .await
            .unwrap();

        let report = enrichment.report;
        assert_eq!(report.account, record);
        assert_eq!(report.container, Container::Profile);
        assert!(report.play_games.is_none());
        assert!(report.maps.is_empty());
        assert!(report.calendar.is_none());
        assert!(enrichment.failures.is_empty());
    }

    #[tokio::test]
    async fn test_full_report_merges_every_section() {
        let mut mocks = MockServices::new();
        mocks.games = Arc::new(MockGames {
            players: vec![PlayerSummary {
                id: "p1".into(),
                name: "jeanplays".into(),
                avatar_url: None,
            }],
            profile: Some(Ok(player("p1"))),
            ..Default::default()
        });
        mocks.maps = Arc::new(MockMaps {
            response: Some(Ok(MapsResponse {
                error: None,
                stats: Some(BTreeMap::from([("Reviews".to_string(), 3)])),
                reviews: Some(vec![]),
                photos: None,
            })),
            ..Default::default()
        });
        mocks.calendar = Arc::new(MockCalendar {
            response: Some(Ok(CalendarResponse {
                found: true,
                calendar: Some(CalendarDetails {
                    id: ADDRESS.into(),
                    summary: None,
                    time_zone: Some("Europe/Paris".into()),
                }),
                events: Some(CalendarEvents {
                    items: vec![CalendarEvent {
                        summary: Some("Dentist".into()),
                        start: None,
                        end: None,
                        location: None,
                    }],
                }),
            })),
            ..Default::default()
        });

        let record = account("42", &[Container::Profile, Container::Contact]);
        let enrichment = aggregator(&mocks)
            .build_report(ADDRESS, record, &Session::new("t"))
            .await
            .unwrap();
        let report = enrichment.report;

        assert_eq!(report.play_games, Some(player("p1")));
        assert_eq!(report.maps.stats.as_ref().unwrap()["Reviews"], 3);
        assert!(report.maps.photos.is_none());
        let calendar = report.calendar.unwrap();
        assert_eq!(calendar.events.unwrap().items.len(), 1);

        assert_eq!(mocks.games.identities.lock().as_slice(), [ADDRESS.to_string()]);
        assert_eq!(mocks.maps.requested.lock()[0].0, "42");
        assert_eq!(mocks.calendar.requested.lock().as_slice(), [ADDRESS.to_string()]);
    }

    #[tokio::test]
    async fn test_maps_error_field_means_no_data() {
        let mut mocks = MockServices::new();
        mocks.maps = Arc::new(MockMaps {
            response: Some(Ok(MapsResponse {
                error: Some("private profile".into()),
                ..Default::default()
            })),
            ..Default::default()
        });
        let enrichment = aggregator(&mocks)
            .build_report(ADDRESS, account("42", &[Container::Profile]), &Session::new("t"))
            .await
            .unwrap();
        assert!(enrichment.report.maps.is_empty());
        assert!(enrichment.failures.is_empty());
    }

    #[tokio::test]
    async fn test_calendar_not_found_is_absent() {
        let mut mocks = MockServices::new();
        mocks.calendar = Arc::new(MockCalendar {
            response: Some(Ok(CalendarResponse {
                found: false,
                calendar: None,
                events: None,
            })),
            ..Default::default()
        });
        let enrichment = aggregator(&mocks)
            .build_report(ADDRESS, account("42", &[Container::Profile]), &Session::new("t"))
            .await
            .unwrap();
        assert!(enrichment.report.calendar.is_none());
    }

    #[tokio::test]
    async fn test_sub_service_failures_are_collected() {
        let mut mocks = MockServices::new();
        mocks.games = Arc::new(MockGames {
            search_error: Some(ServiceError::SessionExpired),
            ..Default::default()
        });
        mocks.maps = Arc::new(MockMaps {
            response: Some(Err(ServiceError::Timeout)),
            ..Default::default()
        });
        let enrichment = aggregator(&mocks)
            .build_report(ADDRESS, account("42", &[Container::Profile]), &Session::new("t"))
            .await
            .unwrap();

        assert!(enrichment.report.play_games.is_none());
        assert!(enrichment.report.maps.is_empty());
        assert_eq!(enrichment.failures.len(), 2);
        assert!(enrichment.session_expired());
        assert_eq!(enrichment.failures[0].section, Section::PlayGames);
        assert_eq!(enrichment.failures[1].section, Section::Maps);
    }

    #[tokio::test]
    async fn test_player_fetch_failure_leaves_section_empty() {
        let mut mocks = MockServices::new();
        mocks.games = Arc::new(MockGames {
            players: vec![PlayerSummary {
                id: "p1".into(),
                name: "jeanplays".into(),
                avatar_url: None,
            }],
            profile: Some(Err(ServiceError::Status(500))),
            ..Default::default()
        });
        let enrichment = aggregator(&mocks)
            .build_report(ADDRESS, account("42", &[Container::Profile]), &Session::new("t"))
            .await
            .unwrap();
        assert!(enrichment.report.play_games.is_none());
        assert!(!enrichment.session_expired());
        assert_eq!(
            enrichment.failures,
            vec![SectionFailure {
                section: Section::PlayGames,
                error: ServiceError::Status(500)
            }]
        );
    }

    #[tokio::test]
    async fn test_missing_profile_container_is_rejected() {
        let mocks = MockServices::new();
        let result = aggregator(&mocks)
            .build_report(ADDRESS, account("42", &[Container::Contact]), &Session::new("t"))
            .await;
        assert!(matches!(result, Err(AppError::NoPublicProfile(_))));
        assert!(mocks.maps.requested.lock().is_empty());
    }
}
