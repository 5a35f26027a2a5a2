use super::*;

/// Stop the music playback and clear the queue
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let result = ctx.data().music.stop_and_clear().await;
    respond(ctx, result, embedded_messages::stopped).await
}
