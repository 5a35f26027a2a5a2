use std::sync::Arc;

use ::serenity::all::ClientBuilder;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use songbird::{SerenityInit, Songbird};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tunebot::{
    AudioSources, BotConfig, ChannelAnnouncer, Data, Error, HTTP_CLIENT, MusicManager,
    SongbirdDriver, events::Handler,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tunebot=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();

    let config = BotConfig::from_env()?;

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    // One voice manager and one playback session for the whole process
    let songbird = Songbird::serenity();
    let http = Arc::new(serenity::Http::new(&config.discord_token));
    let music = MusicManager::new(
        Arc::new(SongbirdDriver::new(songbird.clone(), HTTP_CLIENT.clone())),
        Arc::new(ChannelAnnouncer::new(http)),
        config.playback.clone(),
    );
    let sources = AudioSources::from_config(&config);

    let session = music.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: tunebot::commands(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.command_prefix.clone()),
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot is ready! Logged in as {}", ready.user.name);
                let commands = &framework.options().commands;
                poise::builtins::register_globally(ctx, commands).await?;
                info!("Synced {} slash commands.", commands.len());
                Ok(Data {
                    music: session,
                    sources,
                })
            })
        });

    let mut client = ClientBuilder::new(&config.discord_token, intents)
        .framework(framework.build())
        .event_handler(Handler::new(music))
        .register_songbird_with(songbird)
        .await?;

    client.start().await.map_err(Into::into)
}
