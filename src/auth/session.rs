//! Authenticated Graph session handle.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use zeroize::Zeroizing;

use super::oauth::TokenResponse;
use crate::error::AuthError;

/// How the session's token was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSource {
    /// Bearer token supplied on the command line or environment.
    PreIssuedToken,
    /// Interactive authorization-code sign-in.
    InteractiveSignIn,
}

/// An established session with Microsoft Graph.
///
/// Created once before any lookup and closed after the report is rendered.
/// The access token is zeroized on drop.
pub struct GraphSession {
    access_token: Zeroizing<String>,
    expires_at: Option<DateTime<Utc>>,
    source: SessionSource,
}

impl GraphSession {
    /// Wrap a bearer token obtained elsewhere. Its expiry is unknown.
    pub fn from_access_token(token: impl Into<String>) -> Result<Self, AuthError> {
        let token = Zeroizing::new(token.into());
        if token.trim().is_empty() {
            return Err(AuthError::EmptyToken);
        }

        Ok(Self {
            access_token: token,
            expires_at: None,
            source: SessionSource::PreIssuedToken,
        })
    }

    /// Build a session from a token endpoint response.
    pub fn from_token_response(response: TokenResponse) -> Self {
        let expires_at = Utc::now() + Duration::seconds(response.expires_in as i64);
        Self {
            access_token: Zeroizing::new(response.access_token),
            expires_at: Some(expires_at),
            source: SessionSource::InteractiveSignIn,
        }
    }

    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn source(&self) -> SessionSource {
        self.source
    }

    /// True when a known expiry has passed.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }

    /// End the session.
    pub fn close(self) {
        if self.is_expired() {
            warn!("Graph session token expired before the session was closed");
        }
        info!("Graph session closed");
    }
}

impl std::fmt::Debug for GraphSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphSession")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("source", &self.source)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pre_issued_token() {
        let session = GraphSession::from_access_token("eyJ0eXAi").unwrap();
        assert_eq!(session.access_token(), "eyJ0eXAi");
        assert_eq!(session.source(), SessionSource::PreIssuedToken);
        assert!(session.expires_at().is_none());
        assert!(!session.is_expired());
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(
            GraphSession::from_access_token("  "),
            Err(AuthError::EmptyToken)
        ));
    }

    #[test]
    fn test_token_response_expiry() {
        let session = GraphSession::from_token_response(TokenResponse {
            access_token: "abc".into(),
            token_type: "Bearer".into(),
            expires_in: 3600,
            refresh_token: None,
            scope: String::new(),
        });

        assert_eq!(session.source(), SessionSource::InteractiveSignIn);
        assert!(!session.is_expired());
        let remaining = session.expires_at().unwrap() - Utc::now();
        assert!(remaining.num_minutes() > 55);
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = GraphSession::from_access_token("super-secret").unwrap();
        let debug = format!("{:?}", session);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
