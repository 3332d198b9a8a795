//! JSON-over-HTTP adapter for the lookup bridge.
//!
//! One `reqwest::Client` is shared by every call; the session token travels as
//! a bearer header. See `Services::from_gateway`.

use super::{
    AccountLookup, Authenticator, CalendarService, GamesService, MapsService, Session,
};
use crate::core::config::Config;
use crate::core::error::{AppError, AuthenticationError, Result, ServiceError};
use crate::core::models::{
    AccountId, CalendarResponse, LookupResponse, MapsResponse, PlayerProfile, PlayerSummary,
};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Deserialize)]
struct StoredCredentials {
    token: String,
}

/// Maps a non-success status to the service error it stands for.
fn classify_status(status: StatusCode) -> Option<ServiceError> {
    if status.is_success() {
        None
    } else if status == StatusCode::UNAUTHORIZED {
        Some(ServiceError::SessionExpired)
    } else {
        Some(ServiceError::Status(status.as_u16()))
    }
}

/// Reads the stored session token written by a prior login.
async fn read_credentials(path: &Path) -> std::result::Result<String, AuthenticationError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        tracing::debug!(target: "gateway", "Cannot read credentials at {}: {}", path.display(), e);
        AuthenticationError::MissingCredentials(path.to_path_buf())
    })?;
    let stored: StoredCredentials = serde_json::from_str(&content).map_err(|e| {
        AuthenticationError::Rejected(format!(
            "credentials file '{}' is malformed: {}",
            path.display(),
            e
        ))
    })?;
    let token = stored.token.trim().to_string();
    if token.is_empty() {
        return Err(AuthenticationError::Rejected(format!(
            "credentials file '{}' holds an empty token",
            path.display()
        )));
    }
    Ok(token)
}

/// Client for the lookup bridge implementing every collaborator trait.
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    credentials_path: PathBuf,
}

impl HttpGateway {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        let base_url = Url::parse(&config.service_url)?;
        tracing::debug!(target: "gateway", "HTTP gateway initialized for {}", base_url);
        Ok(Self {
            client,
            base_url,
            credentials_path: config.credentials_path.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        session: Option<&Session>,
    ) -> std::result::Result<T, ServiceError> {
        tracing::trace!(target: "gateway", "GET {}", url);
        let mut request = self.client.get(url.clone());
        if let Some(session) = session {
            request = request.bearer_auth(session.token());
        }
        let response = request.send().await.map_err(|e| {
            tracing::debug!(target: "gateway", "Request to {} failed: {}", url.path(), e);
            ServiceError::from(e)
        })?;
        if let Some(err) = classify_status(response.status()) {
            tracing::debug!(target: "gateway", "{} answered {}", url.path(), response.status());
            return Err(err);
        }
        let body = response.text().await.map_err(ServiceError::from)?;
        serde_json::from_str(&body).map_err(|e| {
            ServiceError::Protocol(format!("undecodable body from {}: {}", url.path(), e))
        })
    }
}

#[async_trait]
impl Authenticator for HttpGateway {
    async fn authenticate(&self) -> std::result::Result<Session, AuthenticationError> {
        let token = read_credentials(&self.credentials_path).await?;
        let url = self.endpoint(&["v1", "session"]);

        let response = self
            .client
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| AuthenticationError::Unavailable(e.to_string()))?;

        match response.status() {
            s if s.is_success() => {
                tracing::info!(target: "gateway", "Stored session accepted by the lookup service.");
                Ok(Session::new(token))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthenticationError::Rejected(
                format!("session check answered {}", response.status()),
            )),
            s => Err(AuthenticationError::Unavailable(format!(
                "session check answered {}",
                s
            ))),
        }
    }

    async fn release(&self, session: Session) {
        tracing::debug!(target: "gateway", "Releasing session opened at {}", session.opened_at());
        drop(session);
    }
}

#[async_trait]
impl AccountLookup for HttpGateway {
    async fn lookup(
        &self,
        address: &str,
        session: &Session,
    ) -> std::result::Result<LookupResponse, ServiceError> {
        let mut url = self.endpoint(&["v1", "people", "lookup"]);
        url.query_pairs_mut().append_pair("email", address);
        self.get_json(url, Some(session)).await
    }
}

#[async_trait]
impl GamesService for HttpGateway {
    async fn search_player(
        &self,
        identity: &str,
        session: &Session,
    ) -> std::result::Result<Vec<PlayerSummary>, ServiceError> {
        let mut url = self.endpoint(&["v1", "games", "players"]);
        url.query_pairs_mut().append_pair("query", identity);
        self.get_json(url, Some(session)).await
    }

    async fn get_player(
        &self,
        player_id: &str,
        session: &Session,
    ) -> std::result::Result<PlayerProfile, ServiceError> {
        let url = self.endpoint(&["v1", "games", "players", player_id]);
        self.get_json(url, Some(session)).await
    }
}

#[async_trait]
impl MapsService for HttpGateway {
    async fn get_reviews(
        &self,
        account_id: &AccountId,
    ) -> std::result::Result<MapsResponse, ServiceError> {
        let url = self.endpoint(&["v1", "maps", &account_id.0, "reviews"]);
        self.get_json(url, None).await
    }
}

#[async_trait]
impl CalendarService for HttpGateway {
    async fn fetch_all(
        &self,
        address: &str,
        session: &Session,
    ) -> std::result::Result<CalendarResponse, ServiceError> {
        let mut url = self.endpoint(&["v1", "calendar"]);
        url.query_pairs_mut().append_pair("email", address);
        self.get_json(url, Some(session)).await
    }
}
