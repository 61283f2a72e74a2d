//! Authentication session state.
//!
//! One [`AuthSession`] per signed-in user, shared by reference with every
//! component that issues authenticated calls. It owns the in-memory
//! credentials, mirrors them to a [`CredentialStore`], serializes token
//! refreshes, and broadcasts [`AuthState`] changes.

use crate::credentials::{CredentialStore, MemoryCredentialStore, StoredCredentials};
use crate::error::Result;
use crate::types::UserProfile;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, MutexGuard, RwLock};
use tracing::{info, warn};

/// Authentication state as seen by the rest of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No credentials
    Anonymous,
    /// Signed in
    Authenticated { is_admin: bool },
    /// Credentials were dropped after a failed refresh; log in again
    ReauthenticationRequired,
}

/// Shared authentication session
pub struct AuthSession {
    credentials: RwLock<StoredCredentials>,
    refresh_gate: Mutex<()>,
    store: Arc<dyn CredentialStore>,
    state: watch::Sender<AuthState>,
}

impl AuthSession {
    /// Create an anonymous session backed by `store`
    ///
    /// Call [`load`](Self::load) to pick up persisted credentials.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        let (state, _) = watch::channel(AuthState::Anonymous);
        Self {
            credentials: RwLock::new(StoredCredentials::default()),
            refresh_gate: Mutex::new(()),
            store,
            state,
        }
    }

    /// Session that persists nothing
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCredentialStore::new()))
    }

    /// Read persisted credentials into memory
    ///
    /// Returns `true` if any were found.
    pub async fn load(&self) -> Result<bool> {
        let Some(stored) = self.store.load().await? else {
            return Ok(false);
        };

        let state = Self::state_for(&stored);
        *self.credentials.write().await = stored;
        self.state.send_replace(state);
        Ok(true)
    }

    /// Current access token
    pub async fn access_token(&self) -> Option<String> {
        self.credentials.read().await.access_token.clone()
    }

    /// Current refresh token
    pub async fn refresh_token(&self) -> Option<String> {
        self.credentials.read().await.refresh_token.clone()
    }

    /// Cached user profile
    pub async fn user(&self) -> Option<UserProfile> {
        self.credentials.read().await.user.clone()
    }

    /// Whether an access token is held
    pub async fn is_authenticated(&self) -> bool {
        self.credentials.read().await.access_token.is_some()
    }

    /// Install a fresh token pair after login
    pub async fn establish(
        &self,
        access: String,
        refresh: String,
        user: Option<UserProfile>,
    ) -> Result<()> {
        self.update(|credentials| {
            credentials.access_token = Some(access);
            credentials.refresh_token = Some(refresh);
            credentials.user = user;
        })
        .await
    }

    /// Replace the access token (and the refresh token, when rotated)
    pub async fn update_tokens(&self, access: String, refresh: Option<String>) -> Result<()> {
        self.update(|credentials| {
            credentials.access_token = Some(access);
            if let Some(refresh) = refresh {
                credentials.refresh_token = Some(refresh);
            }
        })
        .await
    }

    /// Cache the user profile
    pub async fn set_user(&self, user: UserProfile) -> Result<()> {
        self.update(|credentials| credentials.user = Some(user)).await
    }

    /// Drop all credentials (logout)
    pub async fn clear(&self) -> Result<()> {
        *self.credentials.write().await = StoredCredentials::default();
        self.state.send_replace(AuthState::Anonymous);
        self.store.clear().await
    }

    /// Drop all credentials after an unrecoverable refresh failure
    ///
    /// Subscribers see [`AuthState::ReauthenticationRequired`].
    pub async fn expire(&self) {
        *self.credentials.write().await = StoredCredentials::default();
        self.state.send_replace(AuthState::ReauthenticationRequired);
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to remove persisted credentials");
        }
        info!("Session expired; re-authentication required");
    }

    /// Current state
    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Serialize refreshes; held for the whole refresh round trip
    pub(crate) async fn lock_refresh(&self) -> MutexGuard<'_, ()> {
        self.refresh_gate.lock().await
    }

    async fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut StoredCredentials),
    {
        let snapshot = {
            let mut credentials = self.credentials.write().await;
            change(&mut credentials);
            credentials.clone()
        };

        self.state.send_replace(Self::state_for(&snapshot));
        self.store.save(&snapshot).await
    }

    fn state_for(credentials: &StoredCredentials) -> AuthState {
        if credentials.is_empty() {
            AuthState::Anonymous
        } else {
            AuthState::Authenticated {
                is_admin: credentials.user.as_ref().is_some_and(UserProfile::is_admin),
            }
        }
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
