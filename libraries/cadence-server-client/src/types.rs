//! Types for Cadence server API requests and responses.

use cadence_core::{Track, TrackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Configuration for connecting to a Cadence server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URL of the server (e.g., "https://music.example.com")
    pub url: String,
    /// Whole-request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
}

impl ServerConfig {
    /// Create a new server config with default timeouts.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

// =============================================================================
// Authentication Types
// =============================================================================

/// Request body for login endpoint.
///
/// Exactly one of `username`/`email` is set.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
}

impl LoginRequest {
    /// Build a request from whatever the user typed
    ///
    /// Identifiers containing `@` are treated as email addresses.
    pub fn new(identifier: &str, password: &str) -> Self {
        let (username, email) = if identifier.contains('@') {
            (None, Some(identifier.to_string()))
        } else {
            (Some(identifier.to_string()), None)
        };

        Self {
            username,
            email,
            password: password.to_string(),
        }
    }
}

/// Token pair returned by login.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
    /// Some deployments embed the profile in the login response
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Request body for token refresh and blacklist.
#[derive(Debug, Serialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Response from token refresh.
///
/// With rotation enabled the server also returns a new refresh token.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Request body for registration.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Request body for email verification.
#[derive(Debug, Serialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: u32,
}

/// Plain `{"message": ...}` acknowledgement.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Current user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Staff and superusers get the admin surface
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

/// Request body for granting or revoking staff status.
#[derive(Debug, Serialize)]
pub struct AdminUpdateRequest {
    pub is_staff: bool,
}

// =============================================================================
// Library Types
// =============================================================================

/// A song as returned by the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSong {
    pub id: i64,
    pub title: String,
    pub artist_name: String,
    #[serde(default)]
    pub duration: Option<String>,
    pub mp3_file: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub uploaded_by: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ServerSong {
    /// Convert into a playable track
    ///
    /// Relative media and artwork paths are resolved against `base`.
    pub fn into_track(self, base: &Url) -> Track {
        let resolve = |path: &str| {
            base.join(path)
                .map_or_else(|_| path.to_string(), String::from)
        };

        let media_url = resolve(&self.mp3_file);
        let mut track = Track::new(TrackId::from(self.id), self.title, self.artist_name, media_url);

        if let Some(cover) = self.cover_image.as_deref().filter(|c| !c.is_empty()) {
            track = track.with_artwork(resolve(cover));
        }
        if let Some(duration) = self.duration.filter(|d| !d.is_empty()) {
            track = track.with_duration_hint(duration);
        }
        track
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// API error body.
///
/// Covers both the framework's `{"detail", "code"}` shape and the plain
/// `{"message"}` shape some endpoints use.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Error code the JWT layer uses for expired or invalid access tokens
    pub const TOKEN_NOT_VALID: &'static str = "token_not_valid";

    /// Whether this 401 means "access token expired" (and only that)
    pub fn is_token_expired(&self) -> bool {
        if self.code.as_deref() == Some(Self::TOKEN_NOT_VALID) {
            return true;
        }
        self.detail
            .iter()
            .chain(self.message.iter())
            .any(|text| text.to_lowercase().contains("expired"))
    }

    /// Human-readable message
    pub fn message(&self) -> String {
        self.detail
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "Request failed".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_picks_email_or_username() {
        let by_email = serde_json::to_value(LoginRequest::new("amy@example.com", "pw")).unwrap();
        assert_eq!(by_email["email"], "amy@example.com");
        assert!(by_email.get("username").is_none());

        let by_name = serde_json::to_value(LoginRequest::new("amy", "pw")).unwrap();
        assert_eq!(by_name["username"], "amy");
        assert!(by_name.get("email").is_none());
    }

    #[test]
    fn song_converts_to_track() {
        let song: ServerSong = serde_json::from_value(serde_json::json!({
            "id": 12,
            "title": "Yela",
            "artist_name": "Baaba Maal",
            "duration": "4:05",
            "mp3_file": "/media/songs/yela.mp3",
            "cover_image": "https://img.example.com/yela.jpg",
            "uploaded_by": 1,
            "created_at": "2024-03-01T10:00:00Z"
        }))
        .unwrap();

        let base = Url::parse("https://api.example.com").unwrap();
        let track = song.into_track(&base);

        assert_eq!(track.id.as_str(), "12");
        assert_eq!(track.media_url, "https://api.example.com/media/songs/yela.mp3");
        assert_eq!(track.artwork_url.as_deref(), Some("https://img.example.com/yela.jpg"));
        assert_eq!(track.duration_hint.as_deref(), Some("4:05"));
    }

    #[test]
    fn empty_cover_is_no_artwork() {
        let song: ServerSong = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "t",
            "artist_name": "a",
            "mp3_file": "https://cdn.example.com/1.mp3",
            "cover_image": ""
        }))
        .unwrap();

        let track = song.into_track(&Url::parse("https://api.example.com").unwrap());
        assert!(track.artwork_url.is_none());
        assert_eq!(track.media_url, "https://cdn.example.com/1.mp3");
    }

    #[test]
    fn expiry_detection() {
        let coded: ApiErrorBody =
            serde_json::from_str(r#"{"detail":"Given token not valid for any token type","code":"token_not_valid"}"#)
                .unwrap();
        assert!(coded.is_token_expired());

        let worded: ApiErrorBody = serde_json::from_str(r#"{"detail":"Token is expired"}"#).unwrap();
        assert!(worded.is_token_expired());

        let other: ApiErrorBody =
            serde_json::from_str(r#"{"detail":"You do not have permission to perform this action."}"#)
                .unwrap();
        assert!(!other.is_token_expired());
        assert_eq!(other.message(), "You do not have permission to perform this action.");

        assert_eq!(ApiErrorBody::default().message(), "Request failed");
    }

    #[test]
    fn admin_flag() {
        let user: UserProfile = serde_json::from_value(serde_json::json!({
            "id": 1, "username": "root", "email": "r@x", "is_staff": false, "is_superuser": true
        }))
        .unwrap();
        assert!(user.is_admin());
    }
}
