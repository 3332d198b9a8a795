//! Single-owner session lifecycle with lazy re-authentication.

use crate::core::error::AuthenticationError;
use crate::services::{Authenticator, Session};
use std::sync::Arc;

#[derive(Debug)]
enum SessionState {
    Unauthenticated,
    Authenticated(Session),
    Expired,
    Closed,
}

/// Owns the only session handle of a run.
///
/// Consumers borrow the session through `ensure_session` for the duration of
/// one call and report external closure with `invalidate`; the next
/// `ensure_session` re-authenticates once. `close` releases the session and is
/// terminal.
pub struct SessionManager {
    authenticator: Arc<dyn Authenticator>,
    state: SessionState,
    authentications: u32,
}

impl SessionManager {
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            authenticator,
            state: SessionState::Unauthenticated,
            authentications: 0,
        }
    }

    pub fn is_usable(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, SessionState::Closed)
    }

    /// Number of successful authentications so far.
    pub fn authentications(&self) -> u32 {
        self.authentications
    }

    /// Returns a usable session, authenticating first when needed.
    pub async fn ensure_session(&mut self) -> Result<&Session, AuthenticationError> {
        match self.state {
            SessionState::Authenticated(_) => {}
            SessionState::Closed => return Err(AuthenticationError::SessionClosed),
            SessionState::Unauthenticated | SessionState::Expired => {
                let renewing = matches!(self.state, SessionState::Expired);
                if renewing {
                    tracing::info!(target: "session", "Session expired, re-authenticating...");
                } else {
                    tracing::debug!(target: "session", "Authenticating...");
                }
                match self.authenticator.authenticate().await {
                    Ok(session) => {
                        self.authentications += 1;
                        tracing::debug!(target: "session", "Session #{} established.", self.authentications);
                        self.state = SessionState::Authenticated(session);
                    }
                    Err(e) => {
                        tracing::error!(target: "session", "Authentication failed: {}", e);
                        return Err(e);
                    }
                }
            }
        }

        match &self.state {
            SessionState::Authenticated(session) => Ok(session),
            _ => Err(AuthenticationError::SessionClosed),
        }
    }

    /// Marks the current session as closed by the remote side.
    pub fn invalidate(&mut self) {
        if let SessionState::Authenticated(_) = self.state {
            tracing::warn!(target: "session", "Session invalidated; it will be renewed on next use.");
            self.state = SessionState::Expired;
        }
    }

    /// Releases the current session, if any. Idempotent.
    pub async fn close(&mut self) {
        match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Authenticated(session) => {
                self.authenticator.release(session).await;
                tracing::debug!(target: "session", "Session released.");
            }
            SessionState::Closed => {}
            _ => tracing::debug!(target: "session", "No active session to release."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock::MockAuthenticator;

    #[tokio::test]
    async fn test_lazy_authentication() {
        let auth = Arc::new(MockAuthenticator::new());
        let mut manager = SessionManager::new(auth.clone());
        assert!(!manager.is_usable());
        assert_eq!(auth.authentications(), 0);

        let token = manager.ensure_session().await.unwrap().token().to_string();
        assert_eq!(token, "token-0");
        assert!(manager.is_usable());

        manager.ensure_session().await.unwrap();
        assert_eq!(auth.authentications(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_triggers_single_reauthentication() {
        let auth = Arc::new(MockAuthenticator::new());
        let mut manager = SessionManager::new(auth.clone());
        manager.ensure_session().await.unwrap();

        manager.invalidate();
        assert!(!manager.is_usable());

        let token = manager.ensure_session().await.unwrap().token().to_string();
        assert_eq!(token, "token-1");
        assert_eq!(auth.authentications(), 2);
        assert_eq!(manager.authentications(), 2);
    }

    #[tokio::test]
    async fn test_authentication_failure_is_reported() {
        let auth = Arc::new(MockAuthenticator::failing(AuthenticationError::Rejected(
            "bad token".into(),
        )));
        let mut manager = SessionManager::new(auth.clone());
        let err = manager.ensure_session().await.unwrap_err();
        assert_eq!(err, AuthenticationError::Rejected("bad token".into()));
        assert!(!manager.is_usable());
    }

    #[tokio::test]
    async fn test_invalidate_without_session_is_noop() {
        let auth = Arc::new(MockAuthenticator::new());
        let mut manager = SessionManager::new(auth.clone());
        manager.invalidate();
        manager.ensure_session().await.unwrap();
        assert_eq!(auth.authentications(), 1);
    }

    #[tokio::test]
    async fn test_close_releases_once_and_is_terminal() {
        let auth = Arc::new(MockAuthenticator::new());
        let mut manager = SessionManager::new(auth.clone());
        manager.ensure_session().await.unwrap();

        manager.close().await;
        manager.close().await;
        assert_eq!(auth.releases(), 1);
        assert!(manager.is_closed());
        assert_eq!(
            manager.ensure_session().await.unwrap_err(),
            AuthenticationError::SessionClosed
        );
    }

    #[tokio::test]
    async fn test_close_without_session_releases_nothing() {
        let auth = Arc::new(MockAuthenticator::new());
        let mut manager = SessionManager::new(auth.clone());
        manager.close().await;
        assert_eq!(auth.releases(), 0);
        assert!(manager.is_closed());
    }
}
