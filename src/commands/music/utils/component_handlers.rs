use ::serenity::all::{
    ComponentInteraction, CreateInteractionResponse, CreateInteractionResponseMessage,
};
use poise::CreateReply;
use poise::serenity_prelude::Context;
use tracing::{info, warn};

use super::button_controls::PlayerControl;
use super::embedded_messages;
use super::music_manager::MusicManager;

type ButtonInteractionResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Handle a player button press
pub async fn handle_interaction(
    ctx: &Context,
    interaction: &ComponentInteraction,
    music: &MusicManager,
) -> ButtonInteractionResult {
    let custom_id = interaction.data.custom_id.as_str();

    let reply = match PlayerControl::from_custom_id(custom_id) {
        Some(control) => {
            info!(
                "{} pressed {:?} in channel {}",
                interaction.user.name, control, interaction.channel_id
            );
            match music.apply(control).await {
                Ok(outcome) => embedded_messages::control_applied(&outcome),
                Err(err) => embedded_messages::music_error(&err).ephemeral(true),
            }
        }
        None => {
            warn!("Unknown button ID: {}", custom_id);
            embedded_messages::error_reply("Unknown button action.").ephemeral(true)
        }
    };

    interaction
        .create_response(&ctx.http, CreateInteractionResponse::Message(to_message(reply)))
        .await?;

    Ok(())
}

fn to_message(reply: CreateReply) -> CreateInteractionResponseMessage {
    CreateInteractionResponseMessage::new()
        .embeds(reply.embeds)
        .ephemeral(reply.ephemeral.unwrap_or(false))
}
