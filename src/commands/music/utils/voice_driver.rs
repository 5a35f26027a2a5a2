//! The voice driver seam between the playback session and the voice gateway.
//!
//! `MusicManager` only talks to a `VoiceDriver`. `SongbirdDriver` is the real
//! one; tests substitute their own.

use poise::serenity_prelude as serenity;
use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use songbird::error::ControlError;
use songbird::input::HttpRequest;
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::{Event, Songbird, TrackEvent};
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::event_handlers::SongEndNotifier;
use super::music_manager::{MusicError, MusicManager, MusicResult};
use crate::commands::music::audio_sources::track_metadata::Track;

/// Handle of an established voice connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceConnection {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
}

/// How a stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Played to the end, or was stopped.
    Finished,
    /// The driver gave up on the stream.
    Errored(String),
}

/// Callback handed to the driver with every `play`. Carries the generation
/// of that play so the session can ignore completions that arrive late.
#[derive(Clone, Debug)]
pub struct CompletionHook {
    manager: Weak<MusicManager>,
    generation: u64,
}

impl CompletionHook {
    pub(crate) fn new(manager: Weak<MusicManager>, generation: u64) -> Self {
        Self {
            manager,
            generation,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Report the end of the stream back to the session.
    pub async fn notify(&self, outcome: PlaybackOutcome) {
        let Some(manager) = self.manager.upgrade() else {
            debug!("Playback session is gone, dropping completion");
            return;
        };

        if let Err(e) = manager
            .advance_on_completion(self.generation, outcome)
            .await
        {
            error!("Failed to advance the queue: {}", e);
        }
    }
}

/// Operations the playback session needs from the voice layer.
#[async_trait]
pub trait VoiceDriver: Send + Sync {
    async fn connect(&self, guild_id: GuildId, channel_id: ChannelId)
    -> MusicResult<VoiceConnection>;

    async fn disconnect(&self, connection: &VoiceConnection) -> MusicResult<()>;

    /// Start streaming `track`. `on_complete` must be notified exactly once
    /// when the stream ends, however it ends.
    async fn play(
        &self,
        connection: &VoiceConnection,
        track: &Track,
        volume: f32,
        on_complete: CompletionHook,
    ) -> MusicResult<()>;

    async fn stop(&self, connection: &VoiceConnection) -> MusicResult<()>;

    async fn pause(&self, connection: &VoiceConnection) -> MusicResult<()>;

    async fn resume(&self, connection: &VoiceConnection) -> MusicResult<()>;

    async fn set_volume(&self, connection: &VoiceConnection, volume: f32) -> MusicResult<()>;

    async fn is_playing(&self, connection: &VoiceConnection) -> bool;
}

/// `VoiceDriver` backed by songbird.
pub struct SongbirdDriver {
    songbird: Arc<Songbird>,
    http_client: reqwest::Client,
    // Handle of the last track started
    current: Mutex<Option<TrackHandle>>,
}

impl SongbirdDriver {
    pub fn new(songbird: Arc<Songbird>, http_client: reqwest::Client) -> Self {
        Self {
            songbird,
            http_client,
            current: Mutex::new(None),
        }
    }

    async fn current_track(&self) -> MusicResult<TrackHandle> {
        self.current
            .lock()
            .await
            .clone()
            .ok_or(MusicError::NothingPlaying)
    }
}

fn control_error(action: &str, err: ControlError) -> MusicError {
    MusicError::PlaybackError(format!("Failed to {} track: {}", action, err))
}

#[async_trait]
impl VoiceDriver for SongbirdDriver {
    async fn connect(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> MusicResult<VoiceConnection> {
        info!("Joining voice channel {} in guild {}", channel_id, guild_id);

        self.songbird
            .join(guild_id, channel_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;

        Ok(VoiceConnection {
            guild_id,
            channel_id,
        })
    }

    async fn disconnect(&self, connection: &VoiceConnection) -> MusicResult<()> {
        info!("Leaving voice channel in guild {}", connection.guild_id);
        self.current.lock().await.take();

        self.songbird
            .remove(connection.guild_id)
            .await
            .map_err(|e| MusicError::JoinError(format!("Failed to leave voice channel: {}", e)))
    }

    async fn play(
        &self,
        connection: &VoiceConnection,
        track: &Track,
        volume: f32,
        on_complete: CompletionHook,
    ) -> MusicResult<()> {
        let call = self
            .songbird
            .get(connection.guild_id)
            .ok_or(MusicError::NotConnected)?;

        let input = HttpRequest::new(self.http_client.clone(), track.stream_url.clone());

        let track_handle = {
            let mut handler = call.lock().await;
            handler.play_only_input(input.into())
        };
        debug!("Track handle created for: {}", track.title);

        track_handle
            .set_volume(volume)
            .map_err(|e| control_error("set volume on", e))?;

        let notifier = SongEndNotifier::new(on_complete);
        for event in [TrackEvent::End, TrackEvent::Error] {
            track_handle
                .add_event(Event::Track(event), notifier.clone())
                .map_err(|e| control_error("watch", e))?;
        }

        *self.current.lock().await = Some(track_handle);
        Ok(())
    }

    async fn stop(&self, _connection: &VoiceConnection) -> MusicResult<()> {
        let Some(track) = self.current.lock().await.take() else {
            return Ok(());
        };

        match track.stop() {
            Ok(()) | Err(ControlError::Finished) => Ok(()),
            Err(e) => Err(control_error("stop", e)),
        }
    }

    async fn pause(&self, _connection: &VoiceConnection) -> MusicResult<()> {
        self.current_track()
            .await?
            .pause()
            .map_err(|e| control_error("pause", e))
    }

    async fn resume(&self, _connection: &VoiceConnection) -> MusicResult<()> {
        self.current_track()
            .await?
            .play()
            .map_err(|e| control_error("resume", e))
    }

    async fn set_volume(&self, _connection: &VoiceConnection, volume: f32) -> MusicResult<()> {
        self.current_track()
            .await?
            .set_volume(volume)
            .map_err(|e| control_error("set volume on", e))
    }

    async fn is_playing(&self, _connection: &VoiceConnection) -> bool {
        let Some(track) = self.current.lock().await.clone() else {
            return false;
        };

        match track.get_info().await {
            Ok(info) => info.playing == PlayMode::Play,
            Err(e) => {
                warn!("Could not read track state: {}", e);
                false
            }
        }
    }
}
