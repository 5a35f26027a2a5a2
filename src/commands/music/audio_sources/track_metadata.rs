//! Defines the track descriptors that flow from the audio sources into the
//! playback queue, and the conversion from `yt-dlp` output.

use poise::serenity_prelude::ChannelId;
use serde::{Deserialize, Serialize};
use std::process::Output;
use std::time::Duration;
use tracing::debug;

use crate::commands::music::utils::music_manager::MusicError;

/// A fully resolved, playable track.
///
/// Immutable once resolved. It lives in the queue until it is dequeued, and is
/// dropped when it finishes playing or the queue is cleared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    /// The direct stream URL handed to the voice driver.
    pub stream_url: String,
    /// The title shown in embeds and queue listings.
    pub title: String,
    /// Thumbnail or album art URL, if available.
    pub thumbnail: Option<String>,
    /// The human-facing page of the track (e.g. the YouTube watch page).
    pub page_url: Option<String>,
    /// The duration of the track, if available.
    #[serde(with = "humantime_serde", default)]
    pub duration: Option<Duration>,
    /// Text channel where "Now Playing" announcements for this track go.
    pub reply_to: ChannelId,
    /// The name of the user who requested the track.
    pub requested_by: Option<String>,
}

impl Track {
    pub fn new(stream_url: impl Into<String>, title: impl Into<String>, reply_to: ChannelId) -> Self {
        Self {
            stream_url: stream_url.into(),
            title: title.into(),
            thumbnail: None,
            page_url: None,
            duration: None,
            reply_to,
            requested_by: None,
        }
    }

    /// Attach the reply target and requestor to a search result.
    pub fn from_resolved(
        resolved: ResolvedTrack,
        reply_to: ChannelId,
        requested_by: impl Into<String>,
    ) -> Self {
        Self {
            stream_url: resolved.stream_url,
            title: resolved.title,
            thumbnail: resolved.thumbnail,
            page_url: resolved.page_url,
            duration: resolved.duration,
            reply_to,
            requested_by: Some(requested_by.into()),
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: Option<String>) -> Self {
        self.thumbnail = thumbnail;
        self
    }

    /// Link used in embeds: the page URL when known, otherwise the stream itself.
    pub fn link(&self) -> &str {
        self.page_url.as_deref().unwrap_or(&self.stream_url)
    }
}

/// What the search backend returns for a query or URL.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedTrack {
    pub stream_url: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub page_url: Option<String>,
    pub duration: Option<Duration>,
}

impl ResolvedTrack {
    /// Parses the output of `yt-dlp -j`. Only the first entry is used; no
    /// entries at all means the search found nothing.
    pub fn from_ytdlp_json(stdout: &str) -> Result<Self, MusicError> {
        let line = stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or(MusicError::NotFound)?;

        let metadata_json: serde_json::Value = serde_json::from_str(line).map_err(|e| {
            MusicError::AudioSourceError(format!("Failed to parse video metadata: {}", e))
        })?;

        let stream_url = metadata_json["url"]
            .as_str()
            .ok_or_else(|| {
                MusicError::AudioSourceError("yt-dlp returned no stream URL".to_string())
            })?
            .to_string();

        let title = metadata_json["title"]
            .as_str()
            .unwrap_or("Unknown Title")
            .to_string();

        Ok(Self {
            stream_url,
            title,
            thumbnail: metadata_json["thumbnail"].as_str().map(|s| s.to_string()),
            page_url: metadata_json["webpage_url"].as_str().map(|s| s.to_string()),
            duration: metadata_json["duration"]
                .as_f64()
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(Duration::from_secs_f64),
        })
    }
}

/// Converts the raw output of a `yt-dlp` run into a `ResolvedTrack`.
impl TryFrom<Output> for ResolvedTrack {
    type Error = MusicError;

    fn try_from(value: Output) -> Result<Self, Self::Error> {
        let stdout = String::from_utf8_lossy(&value.stdout);

        if !value.status.success() {
            let stderr = String::from_utf8_lossy(&value.stderr);
            let stderr = stderr.trim();
            debug!("yt-dlp exited with {}: {}", value.status, stderr);

            // A failed run with nothing on stdout never got to searching
            if stdout.trim().is_empty() {
                return Err(MusicError::AudioSourceError(if stderr.is_empty() {
                    format!("yt-dlp exited with {}", value.status)
                } else {
                    stderr.to_string()
                }));
            }
        }

        Self::from_ytdlp_json(&stdout)
    }
}

/// Track information from the music catalog, used only to build a search query.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogTrack {
    pub title: String,
    pub artist: String,
    pub art_url: Option<String>,
}

impl CatalogTrack {
    pub fn search_query(&self) -> String {
        format!("{} {}", self.title, self.artist)
    }
}
