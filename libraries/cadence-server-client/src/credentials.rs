//! Persisted credentials.
//!
//! Tokens and the cached user profile survive restarts so the client can
//! re-authenticate silently. They are removed on logout and whenever a
//! refresh fails for good.

use crate::error::{Result, ServerClientError};
use crate::types::UserProfile;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// Everything persisted about a signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredCredentials {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl StoredCredentials {
    /// Nothing worth keeping
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Durable client-local storage for credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read stored credentials, if any
    async fn load(&self) -> Result<Option<StoredCredentials>>;

    /// Replace stored credentials
    async fn save(&self, credentials: &StoredCredentials) -> Result<()>;

    /// Remove stored credentials
    async fn clear(&self) -> Result<()>;
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<StoredCredentials>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let credentials: StoredCredentials = serde_json::from_slice(&raw).map_err(|e| {
            ServerClientError::CredentialStore(format!(
                "Corrupt credentials file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok((!credentials.is_empty()).then_some(credentials))
    }

    async fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(credentials)
            .map_err(|e| ServerClientError::CredentialStore(e.to_string()))?;
        tokio::fs::write(&self.path, json).await?;

        debug!(path = %self.path.display(), "Credentials saved");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "Credentials removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<StoredCredentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store
    pub fn with_credentials(credentials: StoredCredentials) -> Self {
        Self {
            inner: Mutex::new(Some(credentials)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<StoredCredentials>> {
        Ok(self.inner.lock().await.clone())
    }

    async fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        *self.inner.lock().await = Some(credentials.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.inner.lock().await = None;
        Ok(())
    }
}
