//! Azure AD authentication.
//!
//! Establishes the `GraphSession` a report run uses: either a pre-issued
//! bearer token or an interactive authorization-code sign-in with PKCE.

pub mod callback_server;
pub mod oauth;
pub mod session;

use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AuthError;
use callback_server::CallbackServer;
use oauth::{parse_callback_url, OAuth2Client, PkceChallenge};
use session::GraphSession;

/// How long to wait for the browser redirect.
const SIGN_IN_TIMEOUT: Duration = Duration::from_secs(300);

/// Establish the Graph session for one run.
pub async fn establish_session(
    config: &Config,
    access_token: Option<String>,
) -> Result<GraphSession, AuthError> {
    match access_token {
        Some(token) => {
            info!("Using pre-issued access token");
            GraphSession::from_access_token(token)
        }
        None => sign_in(config).await,
    }
}

/// Interactive sign-in through the system browser.
async fn sign_in(config: &Config) -> Result<GraphSession, AuthError> {
    info!("Starting interactive sign-in");

    let oauth_client = OAuth2Client::new(config)?;
    let pkce = PkceChallenge::new();
    let (auth_url, expected_state) = oauth_client.generate_auth_url(&pkce)?;

    let server = CallbackServer::bind(config.oauth.redirect_port)?;
    let waiter = tokio::task::spawn_blocking(move || server.wait_for_callback(SIGN_IN_TIMEOUT));

    if let Err(e) = open::that(auth_url.as_str()) {
        warn!("Failed to open browser: {}", e);
        eprintln!("Open this URL to sign in:\n\n  {}\n", auth_url);
    }

    let callback_url = waiter.await.map_err(|e| {
        error!("Callback listener task failed: {}", e);
        AuthError::CallbackServer(e.to_string())
    })??;

    let (code, state) = parse_callback_url(&callback_url)?;
    if state != expected_state {
        return Err(AuthError::StateValidationFailed);
    }

    let token_response = oauth_client.exchange_code(&code, &pkce.verifier).await?;
    let session = GraphSession::from_token_response(token_response);

    info!(
        "Sign-in successful, token expires at {:?}",
        session.expires_at()
    );
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use session::SessionSource;

    #[tokio::test]
    async fn test_pre_issued_token_skips_sign_in() {
        let session = establish_session(&test_config(), Some("token".into()))
            .await
            .unwrap();
        assert_eq!(session.source(), SessionSource::PreIssuedToken);
    }

    #[tokio::test]
    async fn test_empty_pre_issued_token_fails() {
        let result = establish_session(&test_config(), Some(String::new())).await;
        assert!(matches!(result, Err(AuthError::EmptyToken)));
    }
}
