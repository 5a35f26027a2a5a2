use super::*;
use crate::commands::music::audio_sources::track_metadata::Track;
use crate::commands::music::utils::music_manager::Enqueued;
use tracing::info;

/// Play a song by name or URL
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "Song name or URL"]
    #[rest]
    query: String,
) -> CommandResult {
    info!("Received play command with query: {}", query);

    // Resolving runs yt-dlp, which can take a few seconds
    ctx.defer().await?;

    let result = enqueue_query(ctx, &query, false).await;
    respond(ctx, result, |(track, enqueued)| {
        embedded_messages::added_to_queue(&track, &enqueued)
    })
    .await
}

/// Play a Spotify track by its share link
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn spotify_play(
    ctx: Context<'_>,
    #[description = "Spotify track URL"] url: String,
) -> CommandResult {
    info!("Received spotify_play command with url: {}", url);
    ctx.defer().await?;

    let result = enqueue_query(ctx, &url, true).await;
    respond(ctx, result, |(track, enqueued)| {
        embedded_messages::added_to_queue(&track, &enqueued)
    })
    .await
}

/// Join the author's channel if needed, resolve the query and queue the result.
async fn enqueue_query(
    ctx: Context<'_>,
    query: &str,
    catalog_only: bool,
) -> MusicResult<(Track, Enqueued)> {
    let guild_id = guild_id(&ctx)?;
    let data = ctx.data();

    data.music
        .ensure_connected(guild_id, author_voice_channel(&ctx, guild_id))
        .await?;

    let requested_by = ctx.author().name.clone();
    let track = if catalog_only {
        data.sources
            .resolve_catalog_link(query, requested_by, ctx.channel_id())
            .await?
    } else {
        data.sources
            .resolve(query, requested_by, ctx.channel_id())
            .await?
    };

    let enqueued = data.music.enqueue(track.clone()).await?;
    Ok((track, enqueued))
}
