use super::*;

/// Skip the currently playing song
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn skip(ctx: Context<'_>) -> CommandResult {
    let reply = match ctx.data().music.skip().await {
        Ok(_) => embedded_messages::skipping(),
        Err(MusicError::NothingPlaying) => embedded_messages::no_song_playing(),
        Err(err) => embedded_messages::music_error(&err),
    };

    ctx.send(reply).await?;
    Ok(())
}
