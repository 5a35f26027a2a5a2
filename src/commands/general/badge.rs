use crate::commands::music::utils::embedded_messages;
use crate::{CommandResult, Context};

/// Register for the Active Developer Badge
#[poise::command(slash_command, rename = "register-badge", category = "General")]
pub async fn register_badge(ctx: Context<'_>) -> CommandResult {
    ctx.send(embedded_messages::badge()).await?;
    Ok(())
}
