//! Cadence Server Client
//!
//! HTTP client library for the Cadence music server API.
//!
//! # Features
//!
//! - **Authentication**: login with username or email, registration, email
//!   verification, logout with refresh-token revocation
//! - **Sessions**: persisted credentials, silent re-authentication at
//!   startup, single-flight token refresh on expiry
//! - **Library**: list songs, by artist or by title, as playable
//!   [`Track`](cadence_core::Track)s, and upload new songs
//! - **Administration**: list, promote and delete users (staff only)
//!
//! # Example
//!
//! ```ignore
//! use cadence_server_client::{AuthSession, CadenceClient, FileCredentialStore, ServerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(FileCredentialStore::new("credentials.json"));
//!     let session = Arc::new(AuthSession::new(store));
//!     let client = CadenceClient::new(ServerConfig::new("https://music.example.com"), session)?;
//!
//!     // Reuse stored credentials, or log in
//!     if client.restore_session().await?.is_none() {
//!         client.login("amy", "password").await?;
//!     }
//!
//!     let tracks = client.list_tracks().await?;
//!     println!("Found {} tracks", tracks.len());
//!
//!     Ok(())
//! }
//! ```

mod admin;
mod auth;
mod client;
mod credentials;
mod error;
mod library;
mod session;
mod types;
mod upload;

// Re-export main types
pub use client::CadenceClient;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoredCredentials};
pub use error::{Result, ServerClientError};
pub use session::{AuthSession, AuthState};
pub use upload::TrackUpload;
pub use types::{
    ApiErrorBody, AuthTokens, LoginRequest, MessageResponse, RefreshResponse, ServerConfig,
    ServerSong, UserProfile,
};

// Re-export sub-clients for direct use if needed
pub use auth::AuthClient;
