//! Authentication endpoints.
//!
//! These calls carry no bearer token (or, for the blacklist call, carry it
//! but never trigger a refresh). Token bookkeeping lives in
//! [`CadenceClient`](crate::CadenceClient).

use crate::client::{error_from_response, read_json};
use crate::error::{Result, ServerClientError};
use crate::types::{
    ApiErrorBody, AuthTokens, LoginRequest, MessageResponse, RefreshRequest, RefreshResponse,
    RegisterRequest, UserProfile, VerifyEmailRequest,
};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

/// Authentication client for a Cadence server.
pub struct AuthClient<'a> {
    http: &'a Client,
    base_url: &'a Url,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a Url) -> Self {
        Self { http, base_url }
    }

    /// Login with a username or an email address.
    ///
    /// Returns tokens on success.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AuthTokens> {
        let url = endpoint(self.base_url, &["api", "auth", "login"])?;
        debug!(url = %url, identifier = %identifier, "Attempting login");

        let response = self
            .http
            .post(url)
            .json(&LoginRequest::new(identifier, password))
            .send()
            .await
            .map_err(ServerClientError::from_send)?;

        let status = response.status();

        if status.is_success() {
            let tokens: AuthTokens = read_json(response, "login response").await?;
            info!(identifier = %identifier, "Login successful");
            Ok(tokens)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST {
            let body: ApiErrorBody = response.json().await.unwrap_or_default();
            warn!(status = %status, error = %body.message(), "Login rejected");
            Err(ServerClientError::AuthFailed(body.message()))
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<RefreshResponse> {
        let url = endpoint(self.base_url, &["api", "token", "refresh"])?;
        debug!(url = %url, "Refreshing access token");

        let response = self
            .http
            .post(url)
            .json(&RefreshRequest {
                refresh: refresh_token.to_string(),
            })
            .send()
            .await
            .map_err(ServerClientError::from_send)?;

        let status = response.status();

        if status.is_success() {
            let refreshed: RefreshResponse = read_json(response, "refresh response").await?;
            debug!(rotated = refreshed.refresh.is_some(), "Token refresh successful");
            Ok(refreshed)
        } else if status == StatusCode::UNAUTHORIZED {
            warn!("Token refresh failed: refresh token expired or invalid");
            Err(ServerClientError::TokenRefreshFailed(
                "Refresh token expired or invalid".to_string(),
            ))
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Revoke a refresh token.
    pub async fn blacklist(&self, access_token: Option<&str>, refresh_token: &str) -> Result<()> {
        let url = endpoint(self.base_url, &["api", "token", "blacklist"])?;
        debug!(url = %url, "Blacklisting refresh token");

        let mut request = self.http.post(url).json(&RefreshRequest {
            refresh: refresh_token.to_string(),
        });
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(ServerClientError::from_send)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Create an account. The server emails a verification code.
    pub async fn register(&self, request: &RegisterRequest) -> Result<MessageResponse> {
        let url = endpoint(self.base_url, &["api", "auth", "register"])?;
        debug!(url = %url, username = %request.username, "Registering account");

        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(ServerClientError::from_send)?;

        if response.status().is_success() {
            read_json(response, "register response").await
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Confirm an email address with the emailed code.
    pub async fn verify_email(&self, request: &VerifyEmailRequest) -> Result<MessageResponse> {
        let url = endpoint(self.base_url, &["api", "auth", "verify-email"])?;
        debug!(url = %url, email = %request.email, "Verifying email");

        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(ServerClientError::from_send)?;

        if response.status().is_success() {
            read_json(response, "verify response").await
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Get the profile behind an access token, without refreshing.
    pub async fn get_current_user(&self, access_token: &str) -> Result<UserProfile> {
        let url = endpoint(self.base_url, &["api", "auth", "me"])?;
        debug!(url = %url, "Getting current user info");

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(ServerClientError::from_send)?;

        if response.status().is_success() {
            read_json(response, "user info").await
        } else {
            Err(error_from_response(response).await)
        }
    }
}

/// Build `<base>/<segments...>/`, percent-encoding each segment.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ServerClientError::InvalidUrl(format!("{} cannot be a base", base)))?
        .pop_if_empty()
        .extend(segments)
        .push("");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_end_with_slash_and_encode_segments() {
        let base = Url::parse("https://api.example.com").unwrap();

        let url = endpoint(&base, &["api", "songs", "artists", "Baaba Maal"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/songs/artists/Baaba%20Maal/");

        let url = endpoint(&base, &["api", "auth", "me"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/auth/me/");
    }

    #[test]
    fn endpoints_keep_base_path() {
        let base = Url::parse("https://example.com/music").unwrap();
        let url = endpoint(&base, &["api", "songs"]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/music/api/songs/");
    }

    #[test]
    fn slash_in_segment_is_escaped() {
        let base = Url::parse("https://api.example.com").unwrap();
        let url = endpoint(&base, &["api", "songs", "titles", "AC/DC"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/songs/titles/AC%2FDC/");
    }
}
