//! Mock implementations for external dependencies
//! Stand-ins for the voice driver and the playback notifier

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockall::mock;
use poise::serenity_prelude::{ChannelId, GuildId};
use tunebot::{
    CompletionHook, MusicError, MusicResult, PlaybackNotifier, PlaybackOutcome, Track,
    VoiceConnection, VoiceDriver,
};

/// A call the session made on the voice driver
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    Connect(ChannelId),
    Disconnect,
    Play { title: String, volume: f32 },
    Stop,
    Pause,
    Resume,
    SetVolume(f32),
}

/// Voice driver that records every call and hands completion back to the test.
///
/// `stop` does not complete the track on its own; call `finish` to deliver
/// the completion the real driver would send.
#[derive(Default)]
pub struct RecordingDriver {
    calls: Mutex<Vec<DriverCall>>,
    hooks: Mutex<Vec<(String, CompletionHook)>>,
    failing: Mutex<HashSet<String>>,
    refuse_connect: AtomicBool,
    playing: AtomicBool,
}

impl RecordingDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Refuse to start tracks with this title
    pub fn fail_on(&self, title: &str) {
        self.failing.lock().unwrap().insert(title.to_string());
    }

    pub fn refuse_connect(&self) {
        self.refuse_connect.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Titles of every track the session asked to play, in order
    pub fn played(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DriverCall::Play { title, .. } => Some(title),
                _ => None,
            })
            .collect()
    }

    /// Hook of the last track that started successfully
    pub fn last_hook(&self) -> Option<CompletionHook> {
        self.hooks.lock().unwrap().last().map(|(_, hook)| hook.clone())
    }

    pub fn hook_for(&self, title: &str) -> Option<CompletionHook> {
        self.hooks
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(started, _)| started == title)
            .map(|(_, hook)| hook.clone())
    }

    /// End the last started track
    pub async fn finish(&self, outcome: PlaybackOutcome) {
        let hook = self.last_hook().expect("no track was started");
        self.playing.store(false, Ordering::SeqCst);
        hook.notify(outcome).await;
    }

    fn record(&self, call: DriverCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl VoiceDriver for RecordingDriver {
    async fn connect(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> MusicResult<VoiceConnection> {
        if self.refuse_connect.load(Ordering::SeqCst) {
            return Err(MusicError::JoinError("connection refused".to_string()));
        }

        self.record(DriverCall::Connect(channel_id));
        Ok(VoiceConnection {
            guild_id,
            channel_id,
        })
    }

    async fn disconnect(&self, _connection: &VoiceConnection) -> MusicResult<()> {
        self.record(DriverCall::Disconnect);
        Ok(())
    }

    async fn play(
        &self,
        _connection: &VoiceConnection,
        track: &Track,
        volume: f32,
        on_complete: CompletionHook,
    ) -> MusicResult<()> {
        self.record(DriverCall::Play {
            title: track.title.clone(),
            volume,
        });

        if self.failing.lock().unwrap().contains(&track.title) {
            return Err(MusicError::PlaybackError("cannot open stream".to_string()));
        }

        self.hooks
            .lock()
            .unwrap()
            .push((track.title.clone(), on_complete));
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self, _connection: &VoiceConnection) -> MusicResult<()> {
        self.record(DriverCall::Stop);
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn pause(&self, _connection: &VoiceConnection) -> MusicResult<()> {
        self.record(DriverCall::Pause);
        Ok(())
    }

    async fn resume(&self, _connection: &VoiceConnection) -> MusicResult<()> {
        self.record(DriverCall::Resume);
        Ok(())
    }

    async fn set_volume(&self, _connection: &VoiceConnection, volume: f32) -> MusicResult<()> {
        self.record(DriverCall::SetVolume(volume));
        Ok(())
    }

    async fn is_playing(&self, _connection: &VoiceConnection) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

/// Something the session told its users
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    NowPlaying(String),
    Failed(String, MusicError),
}

/// Notifier that keeps every notice
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<(String, MusicError)> {
        self.notices()
            .into_iter()
            .filter_map(|notice| match notice {
                Notice::Failed(title, err) => Some((title, err)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl PlaybackNotifier for RecordingNotifier {
    async fn now_playing(&self, track: &Track) {
        self.notices
            .lock()
            .unwrap()
            .push(Notice::NowPlaying(track.title.clone()));
    }

    async fn playback_failed(&self, track: &Track, error: &MusicError) {
        self.notices
            .lock()
            .unwrap()
            .push(Notice::Failed(track.title.clone(), error.clone()));
    }
}

mock! {
    pub Driver {}

    #[async_trait]
    impl VoiceDriver for Driver {
        async fn connect(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<VoiceConnection>;
        async fn disconnect(&self, connection: &VoiceConnection) -> MusicResult<()>;
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
}
