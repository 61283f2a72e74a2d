//! Error types for the Cadence server client.

use thiserror::Error;

/// Errors that can occur when talking to a Cadence server.
#[derive(Error, Debug)]
pub enum ServerClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Authentication required but no token available
    #[error("Authentication required")]
    AuthRequired,

    /// Login rejected (bad credentials, inactive or unverified account)
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Request rejected for a reason other than token expiry
    #[error("Unauthorized: {message}")]
    Unauthorized {
        code: Option<String>,
        message: String,
    },

    /// The signed-in user may not perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Local file to upload does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Credentials are gone; the user has to log in again
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// Token refresh failed
    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),

    /// Reading or writing persisted credentials failed
    #[error("Credential store error: {0}")]
    CredentialStore(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerClientError {
    /// Whether the error means the user must authenticate again
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ServerClientError::AuthRequired
                | ServerClientError::AuthFailed(_)
                | ServerClientError::Unauthorized { .. }
                | ServerClientError::SessionExpired
                | ServerClientError::TokenRefreshFailed(_)
        )
    }

    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            ServerClientError::ServerUnreachable(e.to_string())
        } else {
            ServerClientError::Request(e)
        }
    }
}

/// Result type for server client operations.
pub type Result<T> = std::result::Result<T, ServerClientError>;
