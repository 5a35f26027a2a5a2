use super::*;

/// Pause the currently playing song
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn pause(ctx: Context<'_>) -> CommandResult {
    let reply = match ctx.data().music.pause().await {
        Ok(_) => embedded_messages::paused(),
        Err(MusicError::NothingPlaying) => embedded_messages::nothing_to_pause(),
        Err(err) => embedded_messages::music_error(&err),
    };

    ctx.send(reply).await?;
    Ok(())
}

/// Resume the paused song
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn resume(ctx: Context<'_>) -> CommandResult {
    let result = ctx.data().music.resume().await;
    respond(ctx, result, |_| embedded_messages::resumed()).await
}
