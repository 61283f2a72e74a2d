/// Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};

/// Playable track
///
/// Immutable value created by a track source. The playback core only ever
/// clones and compares tracks; it never edits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Duration as advertised by the source (e.g. "3:45"), display only
    pub duration_hint: Option<String>,

    /// Locator of the playable media
    pub media_url: String,

    /// Locator of the cover art
    pub artwork_url: Option<String>,
}

impl Track {
    /// Create a new track with the fields the player needs
    pub fn new(
        id: TrackId,
        title: impl Into<String>,
        artist: impl Into<String>,
        media_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            artist: artist.into(),
            duration_hint: None,
            media_url: media_url.into(),
            artwork_url: None,
        }
    }

    /// Attach cover art
    #[must_use]
    pub fn with_artwork(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    /// Attach the advertised duration
    #[must_use]
    pub fn with_duration_hint(mut self, hint: impl Into<String>) -> Self {
        self.duration_hint = Some(hint.into());
        self
    }

    /// Whether two values denote the same track
    pub fn is(&self, other: &Track) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_by_id_only() {
        let a = Track::new(TrackId::new("1"), "Title", "Artist", "https://x/1.mp3");
        let renamed = Track::new(TrackId::new("1"), "Other", "Artist", "https://x/1b.mp3");
        let b = Track::new(TrackId::new("2"), "Title", "Artist", "https://x/1.mp3");

        assert!(a.is(&renamed));
        assert!(!a.is(&b));
    }

    #[test]
    fn builder_sets_optional_fields() {
        let track = Track::new(TrackId::new("1"), "T", "A", "https://x/1.mp3")
            .with_artwork("https://x/1.jpg")
            .with_duration_hint("3:21");

        assert_eq!(track.artwork_url.as_deref(), Some("https://x/1.jpg"));
        assert_eq!(track.duration_hint.as_deref(), Some("3:21"));
    }
}
