use ::serenity::all::{CreateMessage, Http};
use poise::serenity_prelude as serenity;
use serenity::async_trait;
use songbird::tracks::PlayMode;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::embedded_messages;
use super::music_manager::MusicError;
use super::voice_driver::{CompletionHook, PlaybackOutcome};
use crate::commands::music::audio_sources::track_metadata::Track;

/// Event handler for when a song ends
#[derive(Clone)]
pub struct SongEndNotifier {
    hook: CompletionHook,
}

impl SongEndNotifier {
    pub fn new(hook: CompletionHook) -> Self {
        Self { hook }
    }
}

#[async_trait]
impl songbird::EventHandler for SongEndNotifier {
    async fn act(&self, ctx: &songbird::EventContext<'_>) -> Option<songbird::Event> {
        if let songbird::EventContext::Track(tracks) = ctx {
            let outcome = tracks
                .iter()
                .find_map(|(state, _)| match &state.playing {
                    PlayMode::Errored(e) => Some(PlaybackOutcome::Errored(format!("{:?}", e))),
                    _ => None,
                })
                .unwrap_or(PlaybackOutcome::Finished);

            info!(
                "Track ended (generation {}): {:?}",
                self.hook.generation(),
                outcome
            );

            // Leave the driver's event task before touching the session
            let hook = self.hook.clone();
            tokio::spawn(async move { hook.notify(outcome).await });
        }
        None
    }
}

/// Receives playback events meant for users.
#[async_trait]
pub trait PlaybackNotifier: Send + Sync {
    /// A track started streaming.
    async fn now_playing(&self, track: &Track);

    /// The session gave up on `track` and went idle.
    async fn playback_failed(&self, track: &Track, error: &MusicError);
}

/// Posts playback events to the text channel each track was requested from.
pub struct ChannelAnnouncer {
    http: Arc<Http>,
}

impl ChannelAnnouncer {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    async fn send(&self, track: &Track, message: CreateMessage) {
        if let Err(e) = track
            .reply_to
            .send_message(self.http.as_ref(), message)
            .await
        {
            warn!("Failed to post to channel {}: {}", track.reply_to, e);
        }
    }
}

#[async_trait]
impl PlaybackNotifier for ChannelAnnouncer {
    async fn now_playing(&self, track: &Track) {
        let reply = embedded_messages::now_playing(track);
        let message = CreateMessage::new()
            .embeds(reply.embeds)
            .components(reply.components.unwrap_or_default());

        self.send(track, message).await;
    }

    async fn playback_failed(&self, track: &Track, error: &MusicError) {
        error!("Playback failed for '{}': {}", track.title, error);

        let reply = embedded_messages::music_error(error);
        self.send(track, CreateMessage::new().embeds(reply.embeds)).await;
    }
}
