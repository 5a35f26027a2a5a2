use super::*;
use crate::commands::music::utils::voice_driver::VoiceConnection;

/// Join your voice channel
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn join(ctx: Context<'_>) -> CommandResult {
    let result = connect_author(ctx).await;
    respond(ctx, result, |connection| {
        embedded_messages::joined(connection.channel_id)
    })
    .await
}

/// Join your voice channel and stay connected
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn stay(ctx: Context<'_>) -> CommandResult {
    let result = match ctx.data().music.connection().await {
        Some(connection) => Ok((connection, true)),
        None => connect_author(ctx).await.map(|connection| (connection, false)),
    };

    respond(ctx, result, |(connection, already_connected)| {
        embedded_messages::staying(connection.channel_id, already_connected)
    })
    .await
}

async fn connect_author(ctx: Context<'_>) -> MusicResult<VoiceConnection> {
    let guild_id = guild_id(&ctx)?;
    let channel_id =
        author_voice_channel(&ctx, guild_id).ok_or(MusicError::NotInVoiceChannel)?;

    ctx.data().music.connect(guild_id, channel_id).await
}
