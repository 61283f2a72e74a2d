//! Song listing endpoints.

use crate::auth::endpoint;
use crate::client::CadenceClient;
use crate::error::{Result, ServerClientError};
use crate::types::ServerSong;
use async_trait::async_trait;
use cadence_core::{LoadError, Track, TrackSource};
use tracing::debug;

impl CadenceClient {
    /// All songs visible to the signed-in user.
    pub async fn list_tracks(&self) -> Result<Vec<Track>> {
        self.fetch_songs(&["api", "songs"]).await
    }

    /// Songs by one artist.
    pub async fn tracks_by_artist(&self, artist: &str) -> Result<Vec<Track>> {
        self.fetch_songs(&["api", "songs", "artists", artist]).await
    }

    /// Songs with a given title.
    pub async fn tracks_by_title(&self, title: &str) -> Result<Vec<Track>> {
        self.fetch_songs(&["api", "songs", "titles", title]).await
    }

    async fn fetch_songs(&self, segments: &[&str]) -> Result<Vec<Track>> {
        let url = endpoint(&self.base_url, segments)?;
        debug!(url = %url, "Fetching songs");

        let songs: Vec<ServerSong> = self.get_json(&url, "song list").await?;
        debug!(songs = songs.len(), "Fetched songs");

        Ok(songs
            .into_iter()
            .map(|song| song.into_track(&self.base_url))
            .collect())
    }
}

#[async_trait]
impl TrackSource for CadenceClient {
    async fn list_tracks(&self) -> cadence_core::Result<Vec<Track>> {
        CadenceClient::list_tracks(self).await.map_err(LoadError::from)
    }
}

impl From<ServerClientError> for LoadError {
    fn from(e: ServerClientError) -> Self {
        match e {
            ServerClientError::ParseError(message) => LoadError::Malformed(message),
            e if e.is_auth_error() => LoadError::Unauthorized(e.to_string()),
            e => LoadError::Unavailable(e.to_string()),
        }
    }
}
