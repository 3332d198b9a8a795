//! Contracts of the remote collaborators and their implementations.
//!
//! The resolver never speaks a lookup protocol itself: it drives these traits.
//! `http::HttpGateway` implements all of them against a JSON bridge.

pub mod http;
#[cfg(test)]
pub(crate) mod mock;

use crate::core::error::{AuthenticationError, ServiceError};
use crate::core::models::{
    AccountId, CalendarResponse, LookupResponse, MapsResponse, PlayerProfile, PlayerSummary,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// An authenticated session handle.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    opened_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            opened_at: Utc::now(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("opened_at", &self.opened_at)
            .finish()
    }
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Establishes a new session from stored credentials.
    async fn authenticate(&self) -> Result<Session, AuthenticationError>;

    /// Releases everything tied to `session`. Must not fail.
    async fn release(&self, session: Session);
}

#[async_trait]
pub trait AccountLookup: Send + Sync {
    async fn lookup(&self, address: &str, session: &Session)
        -> Result<LookupResponse, ServiceError>;
}

#[async_trait]
pub trait GamesService: Send + Sync {
    async fn search_player(
        &self,
        identity: &str,
        session: &Session,
    ) -> Result<Vec<PlayerSummary>, ServiceError>;

    async fn get_player(
        &self,
        player_id: &str,
        session: &Session,
    ) -> Result<PlayerProfile, ServiceError>;
}

#[async_trait]
pub trait MapsService: Send + Sync {
    async fn get_reviews(&self, account_id: &AccountId) -> Result<MapsResponse, ServiceError>;
}

#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn fetch_all(
        &self,
        address: &str,
        session: &Session,
    ) -> Result<CalendarResponse, ServiceError>;
}

/// The full set of collaborators used by a run.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn Authenticator>,
    pub lookup: Arc<dyn AccountLookup>,
    pub games: Arc<dyn GamesService>,
    pub maps: Arc<dyn MapsService>,
    pub calendar: Arc<dyn CalendarService>,
}

impl Services {
    /// Uses one gateway for every collaborator.
    pub fn from_gateway(gateway: Arc<http::HttpGateway>) -> Self {
        Self {
            auth: gateway.clone(),
            lookup: gateway.clone(),
            games: gateway.clone(),
            maps: gateway.clone(),
            calendar: gateway,
        }
    }
}
