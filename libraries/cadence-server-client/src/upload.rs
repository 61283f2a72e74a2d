//! Song upload.

use crate::auth::endpoint;
use crate::client::{read_json, CadenceClient};
use crate::error::{Result, ServerClientError};
use crate::types::ServerSong;
use cadence_core::Track;
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// A song to upload, with its audio file and optional cover image.
#[derive(Debug, Clone)]
pub struct TrackUpload {
    pub title: String,
    pub artist_name: String,
    /// Display duration such as "3:45"
    pub duration: Option<String>,
    pub audio: PathBuf,
    pub cover: Option<PathBuf>,
}

impl TrackUpload {
    pub fn new(
        title: impl Into<String>,
        artist_name: impl Into<String>,
        audio: impl Into<PathBuf>,
    ) -> Self {
        Self {
            title: title.into(),
            artist_name: artist_name.into(),
            duration: None,
            audio: audio.into(),
            cover: None,
        }
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn with_cover(mut self, cover: impl Into<PathBuf>) -> Self {
        self.cover = Some(cover.into());
        self
    }
}

/// File contents read once, turned into a fresh form part per attempt.
struct FilePart {
    name: String,
    mime: &'static str,
    contents: Vec<u8>,
}

impl FilePart {
    async fn read(path: &Path, fallback_name: &str) -> Result<Self> {
        if !path.exists() {
            return Err(ServerClientError::FileNotFound(path.display().to_string()));
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(fallback_name)
            .to_string();

        let mut file = File::open(path).await?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).await?;

        Ok(Self {
            name,
            mime: mime_type_for_file(path),
            contents,
        })
    }

    fn part(&self) -> Result<Part> {
        Ok(Part::bytes(self.contents.clone())
            .file_name(self.name.clone())
            .mime_str(self.mime)?)
    }
}

impl CadenceClient {
    /// Upload a song and return it as a playable track.
    ///
    /// Files are read before the request is sent, so a missing file fails
    /// without touching the network.
    pub async fn upload_track(&self, upload: &TrackUpload) -> Result<Track> {
        let audio = FilePart::read(&upload.audio, "track.mp3").await?;
        let cover = match &upload.cover {
            Some(path) => Some(FilePart::read(path, "cover").await?),
            None => None,
        };

        let url = endpoint(&self.base_url, &["api", "songs", "upload"])?;
        debug!(file = %upload.audio.display(), size = audio.contents.len(), "Uploading song");

        let form = || -> Result<Form> {
            let mut form = Form::new()
                .text("title", upload.title.clone())
                .text("artist_name", upload.artist_name.clone())
                .part("mp3_file", audio.part()?);
            if let Some(duration) = &upload.duration {
                form = form.text("duration", duration.clone());
            }
            if let Some(cover) = &cover {
                form = form.part("cover_image", cover.part()?);
            }
            Ok(form)
        };

        let response = self
            .send_authorized(|http| Ok(http.post(url.clone()).multipart(form()?)))
            .await?;
        let song: ServerSong = read_json(response, "uploaded song").await?;

        info!(song_id = song.id, title = %song.title, "Song uploaded");
        Ok(song.into_track(&self.base_url))
    }
}

/// MIME type for an audio or image file, by extension.
fn mime_type_for_file(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mp3") => "audio/mpeg",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("wav") => "audio/wav",
        Some("m4a") | Some("aac") => "audio/mp4",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}
