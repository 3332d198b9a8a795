//! Scripted collaborators for unit tests.

use super::{
    AccountLookup, Authenticator, CalendarService, GamesService, MapsService, Services, Session,
};
use crate::core::error::{AuthenticationError, ServiceError};
use crate::core::models::{
    AccountId, AccountRecord, CalendarResponse, Container, ContainerRecord, ExtendedData,
    LookupResponse, MapsResponse, PlayerProfile, PlayerSummary,
};
use crate::core::pacing::Pacer;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Builds an account visible in the given containers.
pub(crate) fn account(id: &str, containers: &[Container]) -> AccountRecord {
    AccountRecord {
        account_id: AccountId(id.to_string()),
        containers: containers
            .iter()
            .map(|c| (c.clone(), ContainerRecord::default()))
            .collect::<BTreeMap<_, _>>(),
        extended: ExtendedData::default(),
    }
}

pub(crate) fn found(record: AccountRecord) -> Result<LookupResponse, ServiceError> {
    Ok(LookupResponse {
        found: true,
        person: Some(record),
    })
}

pub(crate) fn not_found() -> Result<LookupResponse, ServiceError> {
    Ok(LookupResponse {
        found: false,
        person: None,
    })
}

/// Authenticator returning scripted results, then successes once the script runs out.
#[derive(Default)]
pub(crate) struct MockAuthenticator {
    script: Mutex<VecDeque<Result<Session, AuthenticationError>>>,
    pub(crate) authentications: AtomicUsize,
    pub(crate) releases: AtomicUsize,
}

impl MockAuthenticator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing(error: AuthenticationError) -> Self {
        let auth = Self::default();
        auth.push(Err(error));
        auth
    }

    pub(crate) fn push(&self, result: Result<Session, AuthenticationError>) {
        self.script.lock().push_back(result);
    }

    pub(crate) fn authentications(&self) -> usize {
        self.authentications.load(Ordering::SeqCst)
    }

    pub(crate) fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    async fn authenticate(&self) -> Result<Session, AuthenticationError> {
        let n = self.authentications.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(Session::new(format!("token-{}", n))))
    }

    async fn release(&self, _session: Session) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Lookup answering per address; unknown addresses are not found.
#[derive(Default)]
pub(crate) struct MockLookup {
    responses: Mutex<HashMap<String, VecDeque<Result<LookupResponse, ServiceError>>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockLookup {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, address: &str, response: Result<LookupResponse, ServiceError>) {
        self.responses
            .lock()
            .entry(address.to_string())
            .or_default()
            .push_back(response);
    }

    /// Addresses looked up, in call order.
    pub(crate) fn addresses(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(a, _)| a.clone()).collect()
    }

    /// Session tokens used, in call order.
    pub(crate) fn tokens(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(_, t)| t.clone()).collect()
    }
}

#[async_trait]
impl AccountLookup for MockLookup {
    async fn lookup(
        &self,
        address: &str,
        session: &Session,
    ) -> Result<LookupResponse, ServiceError> {
        self.calls
            .lock()
            .push((address.to_string(), session.token().to_string()));
        self.responses
            .lock()
            .get_mut(address)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(not_found)
    }
}

#[derive(Default)]
pub(crate) struct MockGames {
    pub(crate) players: Vec<PlayerSummary>,
    pub(crate) profile: Option<Result<PlayerProfile, ServiceError>>,
    pub(crate) search_error: Option<ServiceError>,
    pub(crate) identities: Mutex<Vec<String>>,
}

#[async_trait]
impl GamesService for MockGames {
    async fn search_player(
        &self,
        identity: &str,
        _session: &Session,
    ) -> Result<Vec<PlayerSummary>, ServiceError> {
        self.identities.lock().push(identity.to_string());
        match &self.search_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.players.clone()),
        }
    }

    async fn get_player(
        &self,
        player_id: &str,
        _session: &Session,
    ) -> Result<PlayerProfile, ServiceError> {
        match &self.profile {
            Some(result) => result.clone(),
            None => Err(ServiceError::Protocol(format!("unknown player {}", player_id))),
        }
    }
}

#[derive(Default)]
pub(crate) struct MockMaps {
    pub(crate) response: Option<Result<MapsResponse, ServiceError>>,
    pub(crate) requested: Mutex<Vec<AccountId>>,
}

#[async_trait]
impl MapsService for MockMaps {
    async fn get_reviews(&self, account_id: &AccountId) -> Result<MapsResponse, ServiceError> {
        self.requested.lock().push(account_id.clone());
        self.response
            .clone()
            .unwrap_or_else(|| Ok(MapsResponse::default()))
    }
}

#[derive(Default)]
pub(crate) struct MockCalendar {
    pub(crate) response: Option<Result<CalendarResponse, ServiceError>>,
    pub(crate) requested: Mutex<Vec<String>>,
}

#[async_trait]
impl CalendarService for MockCalendar {
    async fn fetch_all(
        &self,
        address: &str,
        _session: &Session,
    ) -> Result<CalendarResponse, ServiceError> {
        self.requested.lock().push(address.to_string());
        self.response
            .clone()
            .unwrap_or_else(|| Ok(CalendarResponse::default()))
    }
}

/// Pacer counting pauses instead of sleeping.
#[derive(Default)]
pub(crate) struct CountingPacer {
    pauses: AtomicUsize,
}

impl CountingPacer {
    pub(crate) fn pauses(&self) -> usize {
        self.pauses.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Pacer for CountingPacer {
    async fn pause(&self) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
    }
}

/// Handles on every mock wired into a `Services` bundle.
pub(crate) struct MockServices {
    pub(crate) auth: Arc<MockAuthenticator>,
    pub(crate) lookup: Arc<MockLookup>,
    pub(crate) games: Arc<MockGames>,
    pub(crate) maps: Arc<MockMaps>,
    pub(crate) calendar: Arc<MockCalendar>,
}

impl MockServices {
    pub(crate) fn new() -> Self {
        Self::with_auth(MockAuthenticator::new())
    }

    pub(crate) fn with_auth(auth: MockAuthenticator) -> Self {
        Self {
            auth: Arc::new(auth),
            lookup: Arc::new(MockLookup::new()),
            games: Arc::new(MockGames::default()),
            maps: Arc::new(MockMaps::default()),
            calendar: Arc::new(MockCalendar::default()),
        }
    }

    pub(crate) fn services(&self) -> Services {
        Services {
            auth: self.auth.clone(),
            lookup: self.lookup.clone(),
            games: self.games.clone(),
            maps: self.maps.clone(),
            calendar: self.calendar.clone(),
        }
    }
}
