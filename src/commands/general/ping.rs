use std::time::Duration;

use crate::commands::music::utils::embedded_messages;
use crate::{CommandResult, Context};

/// Check the bot's latency
#[poise::command(slash_command, prefix_command, category = "General")]
pub async fn ping(ctx: Context<'_>) -> CommandResult {
    let latency = get_shard_latency(&ctx).await;

    ctx.send(embedded_messages::pong(latency)).await?;

    Ok(())
}

async fn get_shard_latency(ctx: &Context<'_>) -> Option<Duration> {
    let shard_manager = ctx.framework().shard_manager();
    let runners = shard_manager.runners.lock().await;

    // Latency of the shard runner this command arrived over
    let runner = runners.get(&ctx.serenity_context().shard_id)?;

    runner.latency
}
