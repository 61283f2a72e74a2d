/// Core traits for Cadence
use crate::error::Result;
use crate::types::Track;
use async_trait::async_trait;

/// Playlist source
///
/// Supplies the ordered list of playable tracks on demand. Implemented by the
/// server client; tests and simulations provide in-memory versions.
///
/// Failures are reported as [`crate::LoadError`] and must never take playback
/// down: the caller keeps the playlist it already has and shows an empty or
/// error state instead.
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// List all playable tracks, in the order the source defines
    ///
    /// # Errors
    /// Returns an error on network/server failure or an unreadable payload
    async fn list_tracks(&self) -> Result<Vec<Track>>;
}

#[async_trait]
impl TrackSource for Vec<Track> {
    async fn list_tracks(&self) -> Result<Vec<Track>> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrackId;

    #[tokio::test]
    async fn in_memory_source_preserves_order() {
        let tracks = vec![
            Track::new(TrackId::new("1"), "One", "A", "https://x/1.mp3"),
            Track::new(TrackId::new("2"), "Two", "B", "https://x/2.mp3"),
        ];

        let listed = tracks.list_tracks().await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
