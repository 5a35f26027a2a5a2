use super::*;

/// Leave the voice channel
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn leave(ctx: Context<'_>) -> CommandResult {
    let result = ctx.data().music.disconnect().await;
    respond(ctx, result, |_| embedded_messages::left()).await
}
