use poise::serenity_prelude as serenity;
use serenity::client::Context;
use serenity::model::id::{ChannelId, GuildId, UserId};
use std::sync::{Arc, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::button_controls::PlayerControl;
use super::event_handlers::PlaybackNotifier;
use super::queue_manager::QueueManager;
use super::voice_driver::{CompletionHook, PlaybackOutcome, VoiceConnection, VoiceDriver};
use crate::commands::music::audio_sources::track_metadata::Track;

/// Errors that can occur during music operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("User is not in a voice channel")]
    NotInVoiceChannel,

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("Already connected to a voice channel")]
    AlreadyConnected,

    #[error("No results found")]
    NotFound,

    #[error("Invalid track link")]
    InvalidLink,

    #[error("Nothing is playing")]
    NothingPlaying,

    #[error("Playback is not paused")]
    NotPaused,

    #[error("Playback error: {0}")]
    PlaybackError(String),

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Audio source error: {0}")]
    AudioSourceError(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// Upper bound of the session volume
pub const MAX_VOLUME: f32 = 2.0;

/// Tunables of the playback session
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSettings {
    /// Pause between a failed track and the next attempt.
    pub retry_delay: Duration,
    /// Consecutive failures after which the session gives up and goes idle.
    pub max_retries: u32,
    pub default_volume: f32,
    pub volume_step: f32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(1),
            max_retries: 3,
            default_volume: 1.0,
            volume_step: 0.1,
        }
    }
}

/// What happened to an enqueued track
#[derive(Debug, Clone, PartialEq)]
pub enum Enqueued {
    /// The session was idle and the track started right away.
    NowPlaying(Track),
    /// 1-based position among the pending tracks.
    Queued { position: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Playback stopped and the queue was cleared.
    Stopped,
    /// Nothing was playing, only the queue was cleared.
    QueueCleared,
}

/// Result of applying a `PlayerControl`
#[derive(Debug, Clone, PartialEq)]
pub enum ControlOutcome {
    Resumed(Track),
    Paused(Track),
    Skipped(Track),
    Volume(f32),
}

struct PlaybackState {
    queue: QueueManager,
    connection: Option<VoiceConnection>,
    // Bumped whenever the current play is started or abandoned
    generation: u64,
    // Consecutive failed plays
    failures: u32,
    volume: f32,
}

/// The single playback session: queue, voice connection and volume.
///
/// Every mutation goes through one lock. Starting the next track happens
/// while holding it, so a completion racing a command can never start two
/// tracks at once.
pub struct MusicManager {
    state: Mutex<PlaybackState>,
    driver: Arc<dyn VoiceDriver>,
    notifier: Arc<dyn PlaybackNotifier>,
    settings: PlaybackSettings,
    me: Weak<MusicManager>,
}

impl MusicManager {
    pub fn new(
        driver: Arc<dyn VoiceDriver>,
        notifier: Arc<dyn PlaybackNotifier>,
        settings: PlaybackSettings,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            state: Mutex::new(PlaybackState {
                queue: QueueManager::new(),
                connection: None,
                generation: 0,
                failures: 0,
                volume: settings.default_volume,
            }),
            driver,
            notifier,
            settings,
            me: me.clone(),
        })
    }

    pub async fn connection(&self) -> Option<VoiceConnection> {
        self.state.lock().await.connection
    }

    pub async fn now_playing(&self) -> Option<Track> {
        self.state.lock().await.queue.current().cloned()
    }

    /// Pending tracks in play order, excluding the one playing.
    pub async fn queued(&self) -> Vec<Track> {
        self.state.lock().await.queue.tracks().cloned().collect()
    }

    pub async fn is_paused(&self) -> bool {
        self.state.lock().await.queue.is_paused()
    }

    pub async fn volume(&self) -> f32 {
        self.state.lock().await.volume
    }

    /// Join a voice channel
    pub async fn connect(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> MusicResult<VoiceConnection> {
        let mut state = self.state.lock().await;

        if state.connection.is_some() {
            return Err(MusicError::AlreadyConnected);
        }

        let connection = self.driver.connect(guild_id, channel_id).await?;
        state.connection = Some(connection);
        info!("Connected to voice channel {} in guild {}", channel_id, guild_id);

        Ok(connection)
    }

    /// Reuse the connection in `guild_id`, or join `user_channel`.
    pub async fn ensure_connected(
        &self,
        guild_id: GuildId,
        user_channel: Option<ChannelId>,
    ) -> MusicResult<VoiceConnection> {
        let mut state = self.state.lock().await;

        if let Some(connection) = state.connection {
            if connection.guild_id == guild_id {
                return Ok(connection);
            }
            return Err(MusicError::AlreadyConnected);
        }

        let channel_id = user_channel.ok_or(MusicError::NotInVoiceChannel)?;
        let connection = self.driver.connect(guild_id, channel_id).await?;
        state.connection = Some(connection);
        info!("Connected to voice channel {} in guild {}", channel_id, guild_id);

        Ok(connection)
    }

    /// Leave the voice channel, dropping the queue and the current track.
    pub async fn disconnect(&self) -> MusicResult<()> {
        let mut state = self.state.lock().await;
        let connection = state.connection.take().ok_or(MusicError::NotConnected)?;

        state.generation += 1;
        state.failures = 0;
        state.queue.clear();

        if self.driver.is_playing(&connection).await {
            if let Err(e) = self.driver.stop(&connection).await {
                warn!("Failed to stop playback before leaving: {}", e);
            }
        }

        self.driver.disconnect(&connection).await
    }

    /// Forget a connection Discord closed on its own (kicked, channel
    /// deleted). The queue and the current track are dropped.
    pub async fn connection_lost(&self, guild_id: GuildId) -> Option<VoiceConnection> {
        let mut state = self.state.lock().await;
        let connection = match state.connection {
            Some(connection) if connection.guild_id == guild_id => connection,
            _ => return None,
        };

        state.connection = None;
        state.generation += 1;
        state.failures = 0;
        state.queue.clear();
        warn!("Lost voice connection in guild {}, queue cleared", guild_id);

        if let Err(e) = self.driver.stop(&connection).await {
            warn!("Failed to stop playback after losing the connection: {}", e);
        }
        if let Err(e) = self.driver.disconnect(&connection).await {
            warn!("Failed to release the voice call: {}", e);
        }

        Some(connection)
    }

    /// Append a track, starting it right away if the session is idle.
    pub async fn enqueue(&self, track: Track) -> MusicResult<Enqueued> {
        let position = {
            let mut state = self.state.lock().await;
            if state.connection.is_none() {
                return Err(MusicError::NotConnected);
            }

            let position = state.queue.enqueue(track.clone());
            info!("Added track to queue: {} (#{})", track.title, position);

            if !state.queue.is_idle() {
                return Ok(Enqueued::Queued { position });
            }
            position
        };

        if let Some(started) = self.start_next().await? {
            if started == track {
                return Ok(Enqueued::NowPlaying(started));
            }
        }

        let state = self.state.lock().await;
        if state.queue.current() == Some(&track) {
            return Ok(Enqueued::NowPlaying(track));
        }

        // A track that failed to start is neither current nor pending
        match state.queue.tracks().position(|queued| queued == &track) {
            Some(index) => Ok(Enqueued::Queued { position: index + 1 }),
            None => {
                warn!(
                    "'{}' was dropped after failing to start (was #{})",
                    track.title, position
                );
                Err(MusicError::PlaybackError(format!(
                    "Could not start {}",
                    track.title
                )))
            }
        }
    }

    /// Dequeue and start tracks until one starts or the queue runs dry.
    ///
    /// Does nothing unless the session is connected and idle.
    async fn start_next(&self) -> MusicResult<Option<Track>> {
        loop {
            let mut state = self.state.lock().await;

            if !state.queue.is_idle() {
                return Ok(None);
            }
            let Some(connection) = state.connection else {
                return Ok(None);
            };
            let Some(track) = state.queue.dequeue_next() else {
                debug!("Queue is empty, session is idle");
                state.failures = 0;
                return Ok(None);
            };

            state.generation += 1;
            let hook = CompletionHook::new(self.me.clone(), state.generation);

            match self
                .driver
                .play(&connection, &track, state.volume, hook)
                .await
            {
                Ok(()) => {
                    drop(state);
                    info!("Now playing: {}", track.title);
                    self.notifier.now_playing(&track).await;
                    return Ok(Some(track));
                }
                Err(e) => {
                    error!("Failed to start '{}': {}", track.title, e);
                    state.queue.finish_current();
                    state.generation += 1;
                    let exhausted = self.record_failure(&mut state);
                    drop(state);

                    if !self.wait_for_retry(&track, exhausted, e.to_string()).await {
                        return Ok(None);
                    }
                }
            }
        }
    }

    /// Handle the end of the stream started with `generation`.
    ///
    /// Completions of an older generation are ignored.
    pub async fn advance_on_completion(
        &self,
        generation: u64,
        outcome: PlaybackOutcome,
    ) -> MusicResult<Option<Track>> {
        let mut state = self.state.lock().await;

        if generation != state.generation {
            debug!(
                "Ignoring stale completion (generation {}, current {})",
                generation, state.generation
            );
            return Ok(None);
        }

        state.generation += 1;
        let finished = state.queue.finish_current();

        match outcome {
            PlaybackOutcome::Finished => {
                state.failures = 0;
                drop(state);
                if let Some(track) = &finished {
                    info!("Track finished: {}", track.title);
                }
            }
            PlaybackOutcome::Errored(reason) => {
                let exhausted = self.record_failure(&mut state);
                drop(state);

                if let Some(track) = &finished {
                    warn!("Playback of '{}' failed: {}", track.title, reason);
                    if !self.wait_for_retry(track, exhausted, reason).await {
                        return Ok(None);
                    }
                }
            }
        }

        self.start_next().await
    }

    /// Count a failed play. Returns true, and resets the count, once the
    /// retry budget is spent.
    fn record_failure(&self, state: &mut PlaybackState) -> bool {
        state.failures += 1;
        let exhausted = state.failures >= self.settings.max_retries;
        if exhausted {
            state.failures = 0;
        }
        exhausted
    }

    /// Sleep before the next attempt, or report the failure and give up.
    async fn wait_for_retry(&self, track: &Track, exhausted: bool, reason: String) -> bool {
        if exhausted {
            warn!(
                "Giving up after {} failed attempts, session is idle",
                self.settings.max_retries
            );
            self.notifier
                .playback_failed(track, &MusicError::PlaybackError(reason))
                .await;
            return false;
        }

        debug!("Retrying in {:?}", self.settings.retry_delay);
        tokio::time::sleep(self.settings.retry_delay).await;
        true
    }

    /// Stop the current track. The completion of the stopped track starts the
    /// next one.
    pub async fn skip(&self) -> MusicResult<Track> {
        let state = self.state.lock().await;
        let current = state
            .queue
            .current()
            .cloned()
            .ok_or(MusicError::NothingPlaying)?;
        let connection = state.connection.ok_or(MusicError::NotConnected)?;

        self.driver.stop(&connection).await?;
        info!("Skipped: {}", current.title);

        Ok(current)
    }

    /// Stop playback and empty the queue.
    pub async fn stop_and_clear(&self) -> MusicResult<StopOutcome> {
        let mut state = self.state.lock().await;
        let was_playing = !state.queue.is_idle();
        let had_queue = !state.queue.is_empty();

        state.queue.clear();

        if was_playing {
            state.generation += 1;
            state.failures = 0;

            if let Some(connection) = state.connection {
                if let Err(e) = self.driver.stop(&connection).await {
                    warn!("Failed to stop playback: {}", e);
                }
            }
            info!("Playback stopped and queue cleared");
            return Ok(StopOutcome::Stopped);
        }

        if state.connection.is_some() && had_queue {
            info!("Queue cleared");
            return Ok(StopOutcome::QueueCleared);
        }

        Err(MusicError::NothingPlaying)
    }

    pub async fn pause(&self) -> MusicResult<Track> {
        let mut state = self.state.lock().await;
        let current = match state.queue.current() {
            Some(track) if !state.queue.is_paused() => track.clone(),
            _ => return Err(MusicError::NothingPlaying),
        };
        let connection = state.connection.ok_or(MusicError::NotConnected)?;

        self.driver.pause(&connection).await?;
        state.queue.set_paused(true);

        Ok(current)
    }

    pub async fn resume(&self) -> MusicResult<Track> {
        let mut state = self.state.lock().await;
        let current = state
            .queue
            .current()
            .cloned()
            .ok_or(MusicError::NothingPlaying)?;
        if !state.queue.is_paused() {
            return Err(MusicError::NotPaused);
        }
        let connection = state.connection.ok_or(MusicError::NotConnected)?;

        self.driver.resume(&connection).await?;
        state.queue.set_paused(false);

        Ok(current)
    }

    pub async fn volume_up(&self) -> MusicResult<f32> {
        self.change_volume(self.settings.volume_step).await
    }

    pub async fn volume_down(&self) -> MusicResult<f32> {
        self.change_volume(-self.settings.volume_step).await
    }

    async fn change_volume(&self, delta: f32) -> MusicResult<f32> {
        let mut state = self.state.lock().await;
        let volume = ((state.volume + delta).clamp(0.0, MAX_VOLUME) * 100.0).round() / 100.0;
        state.volume = volume;

        if let (Some(_), Some(connection)) = (state.queue.current(), state.connection) {
            self.driver.set_volume(&connection, volume).await?;
        }
        debug!("Volume set to {}", volume);

        Ok(volume)
    }

    /// Dispatch a player button.
    pub async fn apply(&self, control: PlayerControl) -> MusicResult<ControlOutcome> {
        match control {
            PlayerControl::Play => self.resume().await.map(ControlOutcome::Resumed),
            PlayerControl::Pause => self.pause().await.map(ControlOutcome::Paused),
            PlayerControl::Next => self.skip().await.map(ControlOutcome::Skipped),
            PlayerControl::VolumeUp => self.volume_up().await.map(ControlOutcome::Volume),
            PlayerControl::VolumeDown => self.volume_down().await.map(ControlOutcome::Volume),
        }
    }

    /// Get the voice channel ID that the user is currently in
    pub fn get_user_voice_channel(
        ctx: &Context,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Option<ChannelId> {
        let guild = ctx.cache.guild(guild_id)?;
        guild
            .voice_states
            .get(&user_id)
            .and_then(|voice_state| voice_state.channel_id)
    }
}
