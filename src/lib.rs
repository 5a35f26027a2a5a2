//! tunebot: a Discord voice bot that streams search results into a voice channel
//! from a single, serialized playback queue.

use std::sync::{Arc, LazyLock};

pub mod commands;
pub mod config;
pub mod events;

pub use commands::music::audio_sources::{
    AudioSources, CatalogLookup, SearchBackend,
    spotify::{SpotifyApi, SpotifyEndpoints},
    track_metadata::{CatalogTrack, ResolvedTrack, Track},
    youtube::YoutubeApi,
};
pub use commands::music::utils::{
    button_controls::PlayerControl,
    event_handlers::{ChannelAnnouncer, PlaybackNotifier},
    music_manager::{
        ControlOutcome, Enqueued, MusicError, MusicManager, MusicResult, PlaybackSettings,
        StopOutcome,
    },
    queue_manager::QueueManager,
    voice_driver::{CompletionHook, PlaybackOutcome, SongbirdDriver, VoiceConnection, VoiceDriver},
};
pub use config::{BotConfig, ConfigError, SpotifyCredentials};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// Shared HTTP client used for catalog requests and audio streams.
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

/// User data, which is stored and accessible in all command invocations
pub struct Data {
    /// The one playback session this bot drives.
    pub music: Arc<MusicManager>,
    /// Search backend and catalog used to turn user queries into tracks.
    pub sources: AudioSources,
}

#[poise::command(slash_command, prefix_command, category = "General")]
async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

#[poise::command(prefix_command, hide_in_help)]
async fn register(ctx: Context<'_>) -> CommandResult {
    poise::builtins::register_application_commands_buttons(ctx)
        .await
        .map_err(|e| e.into())
}

/// Every command the bot registers, in help order.
pub fn commands() -> Vec<poise::Command<Data, Error>> {
    use crate::commands::general::{badge::*, ping::*};
    use crate::commands::music::{
        join::*, leave::*, pause::*, play::*, queue::*, skip::*, stop::*,
    };

    vec![
        // Default commands
        register(),
        help(),
        // General commands
        ping(),
        register_badge(),
        // Music commands
        play(),
        spotify_play(),
        pause(),
        resume(),
        skip(),
        stop(),
        queue(),
        join(),
        stay(),
        leave(),
    ]
}
