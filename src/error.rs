//! Error types for the entra-role-report application.
//!
//! Uses `thiserror` for library-style errors with automatic `Display` and `Error` implementations.

use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Graph API error: {0}")]
    Graph(#[from] GraphError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Authentication-related errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("OAuth2 authorization failed: {0}")]
    OAuthFailed(String),

    #[error("Invalid authorization code")]
    InvalidAuthCode,

    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("State validation failed (possible CSRF attack)")]
    StateValidationFailed,

    #[error("OAuth callback timeout")]
    CallbackTimeout,

    #[error("Callback listener failed: {0}")]
    CallbackServer(String),

    #[error("Access token is empty")]
    EmptyToken,
}

/// Microsoft Graph request errors.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Graph API request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse API response: {0}")]
    ParseFailed(String),

    #[error("Unauthorized (401): Token may be expired")]
    Unauthorized,

    #[error("Forbidden (403): Insufficient permissions")]
    Forbidden,

    #[error("Not found (404): {0}")]
    NotFound(String),

    #[error("Rate limited (429): Too many requests")]
    RateLimited,
}

/// Failures that abort a report run.
///
/// AU lookups never produce one of these; they are absorbed per entry.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to resolve subject '{subject}': {source}")]
    Subject {
        subject: String,
        #[source]
        source: GraphError,
    },

    #[error("Failed to list role assignments for principal {principal_id}: {source}")]
    Assignments {
        principal_id: String,
        #[source]
        source: GraphError,
    },

    #[error("Failed to resolve role definition {role_definition_id}: {source}")]
    RoleDefinition {
        role_definition_id: String,
        #[source]
        source: GraphError,
    },
}

impl ReportError {
    /// The Graph failure underneath this report error.
    pub fn graph_error(&self) -> &GraphError {
        match self {
            Self::Subject { source, .. }
            | Self::Assignments { source, .. }
            | Self::RoleDefinition { source, .. } => source,
        }
    }
}

impl GraphError {
    /// Returns a user-friendly message for terminal output.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Unauthorized => "Access token rejected. Sign in again or supply a fresh token.",
            Self::Forbidden => {
                "Insufficient permissions. The signed-in account needs directory read consent."
            }
            Self::NotFound(_) => "The requested directory object does not exist.",
            Self::RateLimited => "Too many requests. Please wait a moment and retry.",
            Self::RequestFailed(_) => "Network error. Check your connection.",
            Self::ParseFailed(_) => "Unexpected response from Microsoft Graph.",
        }
    }
}

impl AppError {
    /// Returns a user-friendly message for terminal output.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Auth(AuthError::OAuthFailed(_)) => "Sign-in failed. Please try again.",
            Self::Auth(AuthError::StateValidationFailed) => {
                "Security error. Please try signing in again."
            }
            Self::Auth(AuthError::CallbackTimeout) => "Sign-in timed out. Please try again.",
            Self::Auth(AuthError::EmptyToken) => "The supplied access token is empty.",
            Self::Auth(_) => "Sign-in failed. Please try again.",
            Self::Graph(e) => e.user_message(),
            Self::Report(e) => e.graph_error().user_message(),
            Self::Config(_) => "Configuration error. Please check settings.",
            Self::Csv(_) | Self::Io(_) => "Failed to write the report.",
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Auth(_) | Self::Graph(GraphError::Unauthorized) => 3,
            Self::Report(e) if matches!(e.graph_error(), GraphError::Unauthorized) => 3,
            _ => 1,
        }
    }
}
