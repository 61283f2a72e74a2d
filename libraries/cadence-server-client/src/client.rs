//! Main Cadence server client.

use crate::auth::{endpoint, AuthClient};
use crate::error::{Result, ServerClientError};
use crate::session::AuthSession;
use crate::types::{ApiErrorBody, RegisterRequest, ServerConfig, UserProfile, VerifyEmailRequest};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Main client for interacting with a Cadence server.
///
/// Authenticated calls go through a bearer token held by the shared
/// [`AuthSession`]. When the server reports that the token expired, the
/// client refreshes it (once, however many requests noticed at the same
/// time) and retries the request once.
///
/// # Example
///
/// ```ignore
/// use cadence_server_client::{AuthSession, CadenceClient, ServerConfig};
/// use std::sync::Arc;
///
/// let session = Arc::new(AuthSession::in_memory());
/// let client = CadenceClient::new(ServerConfig::new("https://music.example.com"), session)?;
///
/// let user = client.login("amy@example.com", "password").await?;
/// println!("Logged in as {}", user.username);
///
/// let tracks = client.list_tracks().await?;
/// println!("Found {} tracks", tracks.len());
/// ```
pub struct CadenceClient {
    pub(crate) http: Client,
    pub(crate) base_url: Url,
    pub(crate) session: Arc<AuthSession>,
}

impl CadenceClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ServerConfig, session: Arc<AuthSession>) -> Result<Self> {
        // Validate URL
        if config.url.trim().is_empty() {
            return Err(ServerClientError::InvalidUrl("URL cannot be empty".into()));
        }

        // Parse and normalize URL
        let url = config.url.trim().trim_end_matches('/');
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ServerClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        let base_url = Url::parse(url).map_err(|e| ServerClientError::InvalidUrl(e.to_string()))?;

        // Create HTTP client with reasonable defaults
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(format!("Cadence/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Get the server URL.
    pub fn url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Shared authentication session.
    pub fn session(&self) -> &Arc<AuthSession> {
        &self.session
    }

    /// Authentication endpoints without token bookkeeping.
    pub fn auth(&self) -> AuthClient<'_> {
        AuthClient::new(&self.http, &self.base_url)
    }

    // ===== Account =====

    /// Login with a username or email address.
    ///
    /// On success the tokens and profile are stored in the session.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<UserProfile> {
        let tokens = self.auth().login(identifier, password).await?;
        self.session
            .establish(tokens.access, tokens.refresh, tokens.user)
            .await?;

        match self.current_user().await {
            Ok(user) => {
                info!(username = %user.username, admin = user.is_admin(), "Signed in");
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "Could not load profile after login");
                self.session.clear().await?;
                Err(e)
            }
        }
    }

    /// Logout: revoke the refresh token (best effort) and drop credentials.
    pub async fn logout(&self) -> Result<()> {
        if let Some(refresh) = self.session.refresh_token().await {
            let access = self.session.access_token().await;
            if let Err(e) = self.auth().blacklist(access.as_deref(), &refresh).await {
                warn!(error = %e, "Failed to revoke refresh token");
            }
        }

        self.session.clear().await?;
        info!("Logged out");
        Ok(())
    }

    /// Create an account.
    pub async fn register(&self, email: &str, username: &str, password: &str) -> Result<String> {
        let request = RegisterRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        };
        Ok(self.auth().register(&request).await?.message)
    }

    /// Confirm an email address.
    pub async fn verify_email(&self, email: &str, code: u32) -> Result<String> {
        let request = VerifyEmailRequest {
            email: email.to_string(),
            code,
        };
        Ok(self.auth().verify_email(&request).await?.message)
    }

    /// Fetch the signed-in user's profile and cache it.
    pub async fn current_user(&self) -> Result<UserProfile> {
        let url = endpoint(&self.base_url, &["api", "auth", "me"])?;
        let user: UserProfile = self.get_json(&url, "user info").await?;
        self.session.set_user(user.clone()).await?;
        Ok(user)
    }

    /// Silent re-authentication at startup.
    ///
    /// Loads persisted credentials, refreshes when only a refresh token is
    /// left, then validates with the profile endpoint. Auth failures clear
    /// the credentials and yield `Ok(None)`; transport failures keep them
    /// and are returned.
    pub async fn restore_session(&self) -> Result<Option<UserProfile>> {
        if !self.session.load().await? {
            debug!("No stored credentials");
            return Ok(None);
        }

        if self.session.access_token().await.is_none() {
            debug!("Only a refresh token is stored; refreshing");
            if let Err(e) = self.refresh_after(None).await {
                warn!(error = %e, "Silent re-authentication failed");
                return if e.is_auth_error() { Ok(None) } else { Err(e) };
            }
        }

        match self.current_user().await {
            Ok(user) => {
                info!(username = %user.username, "Session restored");
                Ok(Some(user))
            }
            Err(e) if e.is_auth_error() => {
                warn!(error = %e, "Stored session rejected; clearing credentials");
                self.session.clear().await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // ===== Authorized Requests =====

    /// GET `url` with the bearer token and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &Url, what: &str) -> Result<T> {
        let response = self.send_authorized(|http| Ok(http.get(url.clone()))).await?;
        read_json(response, what).await
    }

    /// Send an authenticated request, refreshing once on token expiry.
    ///
    /// `build` is called again for the retry, so it must not consume state.
    pub(crate) async fn send_authorized<F>(&self, build: F) -> Result<Response>
    where
        F: Fn(&Client) -> Result<RequestBuilder>,
    {
        let token = self
            .session
            .access_token()
            .await
            .ok_or(ServerClientError::AuthRequired)?;

        let response = build(&self.http)?
            .bearer_auth(&token)
            .send()
            .await
            .map_err(ServerClientError::from_send)?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response).await;
        }

        let body: ApiErrorBody = response.json().await.unwrap_or_default();
        if !body.is_token_expired() {
            warn!(code = ?body.code, error = %body.message(), "Request unauthorized");
            return Err(ServerClientError::Unauthorized {
                code: body.code.clone(),
                message: body.message(),
            });
        }

        debug!("Access token expired; refreshing");
        let fresh = self.refresh_after(Some(&token)).await?;

        let retry = build(&self.http)?
            .bearer_auth(&fresh)
            .send()
            .await
            .map_err(ServerClientError::from_send)?;
        check_status(retry).await
    }

    /// Single-flight refresh.
    ///
    /// Holds the session's refresh gate for the whole round trip. A caller
    /// that waited on the gate and finds the access token no longer equal to
    /// `stale` reuses it instead of refreshing again.
    async fn refresh_after(&self, stale: Option<&str>) -> Result<String> {
        let _gate = self.session.lock_refresh().await;

        if let (Some(stale), Some(current)) = (stale, self.session.access_token().await) {
            if current != stale {
                debug!("Token already refreshed by a concurrent request");
                return Ok(current);
            }
        }

        let Some(refresh) = self.session.refresh_token().await else {
            self.session.expire().await;
            return Err(ServerClientError::SessionExpired);
        };

        match self.auth().refresh_token(&refresh).await {
            Ok(refreshed) => {
                self.session
                    .update_tokens(refreshed.access.clone(), refreshed.refresh)
                    .await?;
                info!("Access token refreshed");
                Ok(refreshed.access)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed; clearing credentials");
                self.session.expire().await;
                Err(ServerClientError::TokenRefreshFailed(e.to_string()))
            }
        }
    }
}

impl std::fmt::Debug for CadenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CadenceClient")
            .field("base_url", &self.base_url.as_str())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Pass successful responses through, turn the rest into errors.
async fn check_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_from_response(response).await)
    }
}

/// Decode a JSON body, naming what was expected on failure.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| ServerClientError::ParseError(format!("Failed to parse {}: {}", what, e)))
}

/// Map an error response to a client error.
pub(crate) async fn error_from_response(response: Response) -> ServerClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();

    if status == StatusCode::UNAUTHORIZED {
        return ServerClientError::Unauthorized {
            code: body.code.clone(),
            message: body.message(),
        };
    }

    let message = if body.detail.is_some() || body.message.is_some() {
        body.message()
    } else {
        text
    };
    ServerClientError::ServerError {
        status: status.as_u16(),
        message,
    }
}
