use serenity::all::ComponentInteraction;
use serenity::async_trait;
use serenity::model::application::Interaction;
use serenity::model::gateway::Ready;
use serenity::model::voice::VoiceState;
use serenity::prelude::*;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::commands::music::utils::button_controls::CONTROL_PREFIX;
use crate::commands::music::utils::component_handlers;
use crate::commands::music::utils::music_manager::MusicManager;

/// Gateway events outside of poise's command dispatch
pub struct Handler {
    music: Arc<MusicManager>,
}

impl Handler {
    pub fn new(music: Arc<MusicManager>) -> Self {
        Self { music }
    }
}

#[async_trait]
impl serenity::prelude::EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Connected to the gateway as {}", ready.user.name);
    }

    async fn voice_state_update(&self, ctx: Context, _old: Option<VoiceState>, new: VoiceState) {
        if new.channel_id.is_some() || new.user_id != ctx.cache.current_user().id {
            return;
        }

        if let Some(guild_id) = new.guild_id {
            if let Some(connection) = self.music.connection_lost(guild_id).await {
                warn!(
                    "Disconnected from voice channel {} in guild {}",
                    connection.channel_id, guild_id
                );
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Component(component) = interaction {
            if component.data.custom_id.starts_with(CONTROL_PREFIX) {
                self.music_component_interaction(&ctx, &component).await;
            }
        }
    }
}

impl Handler {
    /// Handle component interactions for components with identities starting with "music_"
    async fn music_component_interaction(&self, ctx: &Context, component: &ComponentInteraction) {
        if let Err(e) = component_handlers::handle_interaction(ctx, component, &self.music).await {
            error!("Error handling component interaction: {}", e);
        }
    }
}
