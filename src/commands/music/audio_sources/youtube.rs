//! Implements the `SearchBackend` trait with the `yt-dlp` command-line tool.

use serenity::async_trait;
use tokio::process::Command;
use tracing::info;

use super::{AudioSource, ResolvedTrack, SearchBackend};
use crate::commands::music::utils::music_manager::{MusicError, MusicResult};

/// Prefer m4a so the stream decodes with the bundled aac/isomp4 codecs.
const AUDIO_FORMAT: &str = "bestaudio[ext=m4a]/bestaudio/best";

/// Search backend running `yt-dlp` as a subprocess.
pub struct YoutubeApi {
    ytdlp_path: String,
}

impl YoutubeApi {
    pub fn new(ytdlp_path: impl Into<String>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
        }
    }

    /// The argument handed to yt-dlp: URLs as they are, anything else as a
    /// single-result search.
    fn search_target(query: &str) -> String {
        if AudioSource::is_url(query) {
            query.to_string()
        } else {
            format!("ytsearch1:{}", query)
        }
    }
}

#[async_trait]
impl SearchBackend for YoutubeApi {
    async fn resolve(&self, query_or_url: &str) -> MusicResult<ResolvedTrack> {
        let target = Self::search_target(query_or_url);
        info!("Resolving audio source with yt-dlp: {}", target);

        let output = Command::new(&self.ytdlp_path)
            .args(["-j", "--no-playlist", "-f", AUDIO_FORMAT, target.as_str()])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                MusicError::AudioSourceError(format!("Failed to run {}: {}", self.ytdlp_path, e))
            })?;

        let resolved = ResolvedTrack::try_from(output)?;
        info!("Resolved '{}' to '{}'", query_or_url, resolved.title);

        Ok(resolved)
    }
}
