use poise::{CreateReply, serenity_prelude as serenity};
use serenity::all::{ChannelId, CreateEmbed};
use std::time::Duration;

use super::button_controls::create_music_control_buttons;
use super::format_duration;
use super::music_manager::{ControlOutcome, Enqueued, MusicError, StopOutcome};
use crate::commands::music::audio_sources::track_metadata::Track;

const SUCCESS_COLOR: u32 = 0x00ff00;
const ERROR_COLOR: u32 = 0xff0000;

fn success(description: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .description(description)
            .color(SUCCESS_COLOR),
    )
}

fn failure(description: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .description(description)
            .color(ERROR_COLOR),
    )
}

/// Title linked to the track page, with the duration when known
fn track_line(track: &Track) -> String {
    match track.duration {
        Some(duration) => format!(
            "**[{}]({})** `{}`",
            track.title,
            track.link(),
            format_duration(duration)
        ),
        None => format!("**[{}]({})**", track.title, track.link()),
    }
}

/// Create an embed for when a song is now playing
pub fn now_playing(track: &Track) -> CreateReply {
    let mut embed = CreateEmbed::new()
        .title("Now Playing")
        .description(format!(":notes: {}", track_line(track)))
        .color(SUCCESS_COLOR);

    if let Some(thumbnail) = &track.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }
    if let Some(requested_by) = &track.requested_by {
        embed = embed.field("Requested by", requested_by, true);
    }

    CreateReply::default()
        .embed(embed)
        .components(create_music_control_buttons())
}

/// Create an embed for when a song is added to the queue
pub fn added_to_queue(track: &Track, enqueued: &Enqueued) -> CreateReply {
    let mut embed = CreateEmbed::new()
        .description(format!(":notes: **Added to queue:** {}", track.title))
        .color(SUCCESS_COLOR);

    embed = match enqueued {
        Enqueued::NowPlaying(_) => embed.field("Position", "`Now playing`", true),
        Enqueued::Queued { position } => embed.field("Position", format!("`#{}`", position), true),
    };
    if let Some(thumbnail) = &track.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }

    CreateReply::default()
        .embed(embed)
        .components(create_music_control_buttons())
}

pub fn paused() -> CreateReply {
    success(":pause_button: Paused the music!")
}

pub fn resumed() -> CreateReply {
    success(":arrow_forward: Resumed the music!")
}

pub fn skipping() -> CreateReply {
    success(":track_next: Skipping the current song...")
}

pub fn stopped(outcome: StopOutcome) -> CreateReply {
    match outcome {
        StopOutcome::Stopped => success(":stop_button: Stopped the playback and cleared the queue!"),
        StopOutcome::QueueCleared => success(":stop_button: Queue cleared!"),
    }
}

pub fn nothing_to_pause() -> CreateReply {
    failure(":x: No music to pause!")
}

pub fn no_song_playing() -> CreateReply {
    failure(":x: No song is currently playing!")
}

/// Create an embed for the music queue
pub fn music_queue(now_playing: Option<&Track>, queued: &[Track]) -> CreateReply {
    if queued.is_empty() {
        return failure(":x: The queue is empty!");
    }

    let mut description = String::new();
    if let Some(track) = now_playing {
        description.push_str(&format!(":notes: Now playing: {}\n\n", track_line(track)));
    }

    let lines: Vec<String> = queued
        .iter()
        .enumerate()
        .map(|(index, track)| format!("**{}.** {}", index + 1, track.title))
        .collect();
    description.push_str(&lines.join("\n"));

    let mut embed = CreateEmbed::new()
        .title(":cd: Music Queue")
        .description(description)
        .color(SUCCESS_COLOR);

    let total: Duration = queued.iter().filter_map(|track| track.duration).sum();
    if !total.is_zero() {
        embed = embed.field("Total Duration", format!("`{}`", format_duration(total)), true);
    }

    CreateReply::default().embed(embed)
}

pub fn joined(channel_id: ChannelId) -> CreateReply {
    success(format!(":white_check_mark: Joined <#{}>!", channel_id))
}

pub fn staying(channel_id: ChannelId, already_connected: bool) -> CreateReply {
    if already_connected {
        success(":white_check_mark: I am already connected to a voice channel and staying 24/7.")
    } else {
        success(format!(
            ":white_check_mark: Joined <#{}> and will stay connected 24/7!",
            channel_id
        ))
    }
}

pub fn left() -> CreateReply {
    success(":white_check_mark: Disconnected from the voice channel!")
}

pub fn pong(latency: Option<Duration>) -> CreateReply {
    match latency {
        Some(latency) => success(format!(
            ":ping_pong: Pong! Latency is **{}ms**.",
            latency.as_millis()
        )),
        None => success(":ping_pong: Pong! Latency is not measured yet."),
    }
}

pub fn badge() -> CreateReply {
    CreateReply::default()
        .embed(
            CreateEmbed::new()
                .title("Active Developer Badge")
                .description(
                    "Click [here](https://discord.com/developers/active-developer) to register for the badge.",
                )
                .color(SUCCESS_COLOR),
        )
        .ephemeral(true)
}

/// Ephemeral status for a pressed player button
pub fn control_applied(outcome: &ControlOutcome) -> CreateReply {
    let reply = match outcome {
        ControlOutcome::Resumed(_) => resumed(),
        ControlOutcome::Paused(_) => paused(),
        ControlOutcome::Skipped(_) => skipping(),
        ControlOutcome::Volume(volume) => success(format!(
            ":loud_sound: Volume set to **{:.0}%**",
            volume * 100.0
        )),
    };
    reply.ephemeral(true)
}

/// Red status embed for any music error
pub fn music_error(err: &MusicError) -> CreateReply {
    match err {
        MusicError::NotInGuild => failure(":x: This command only works in a server!"),
        MusicError::NotInVoiceChannel => {
            failure(":x: You need to be in a voice channel to use this command!")
        }
        MusicError::NotConnected => failure(":x: I am not connected to any voice channel!"),
        MusicError::AlreadyConnected => {
            failure(":x: I am already connected to a voice channel!")
        }
        MusicError::NotFound => failure(":x: Could not find the song on YouTube."),
        MusicError::InvalidLink => failure(":x: Please provide a valid Spotify track URL."),
        MusicError::NothingPlaying => failure(":x: No music is currently playing!"),
        MusicError::NotPaused => failure(":x: No music to resume!"),
        other => error_reply(other),
    }
}

/// Catch-all for unexpected failures
pub fn error_reply(err: impl std::fmt::Display) -> CreateReply {
    failure(format!(":x: An error occurred: {}", err))
}
