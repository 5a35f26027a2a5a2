use super::*;

/// View the songs waiting to be played
#[poise::command(
    slash_command,
    prefix_command,
    aliases("queue_list"),
    category = "Music"
)]
pub async fn queue(ctx: Context<'_>) -> CommandResult {
    let music = &ctx.data().music;
    let now_playing = music.now_playing().await;
    let queued = music.queued().await;

    ctx.send(embedded_messages::music_queue(now_playing.as_ref(), &queued))
        .await?;
    Ok(())
}
