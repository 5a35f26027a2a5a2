pub mod join;
pub mod leave;
pub mod pause;
pub mod play;
pub mod queue;
pub mod skip;
pub mod stop;

pub mod audio_sources;
pub mod utils;

use crate::{CommandResult, Context};
use poise::CreateReply;
use poise::serenity_prelude::{ChannelId, GuildId};
use tracing::debug;
use utils::embedded_messages;
use utils::music_manager::{MusicError, MusicManager, MusicResult};

/// Guild the command was invoked from. Music commands are guild-only.
fn guild_id(ctx: &Context<'_>) -> MusicResult<GuildId> {
    ctx.guild_id().ok_or(MusicError::NotInGuild)
}

/// Voice channel the command author is sitting in, if any
fn author_voice_channel(ctx: &Context<'_>, guild_id: GuildId) -> Option<ChannelId> {
    MusicManager::get_user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id)
}

/// Reply with `on_ok`'s embed, or with the error embed when the operation failed.
async fn respond<T>(
    ctx: Context<'_>,
    result: MusicResult<T>,
    on_ok: impl FnOnce(T) -> CreateReply,
) -> CommandResult {
    let reply = match result {
        Ok(value) => on_ok(value),
        Err(err) => {
            debug!("{} failed: {}", ctx.command().name, err);
            embedded_messages::music_error(&err)
        }
    };

    ctx.send(reply).await?;
    Ok(())
}
