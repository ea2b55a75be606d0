mod commands;
mod config;
mod domain;
mod infrastructure;
mod services;

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use songbird::{SerenityInit, Songbird};

use config::Config;
use infrastructure::audio::{SongbirdTransport, YtDlpResolver};
use infrastructure::voice::{ChannelNotifier, SongbirdGateway};
use services::music_service::MusicService;

pub struct Data {
    pub music: MusicService,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::VoiceStateUpdate { old, new } = event {
        let bot_id = ctx.cache.current_user().id;
        if new.user_id != bot_id {
            return Ok(());
        }
        let Some(guild_id) = new.guild_id else {
            return Ok(());
        };
        let before = old.as_ref().and_then(|vs| vs.channel_id);
        data.music
            .lifecycle()
            .on_voice_state_change(guild_id, before, new.channel_id)
            .await;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return;
        }
    };

    let http_client = reqwest::Client::new();
    let manager = Songbird::serenity();
    let queue_capacity = config.queue_capacity;

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::GUILD_VOICE_STATES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let setup_manager = manager.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::join::join(),
                commands::play::play(),
                commands::skip::skip(),
                commands::stop::stop(),
                commands::disconnect::disconnect(),
                commands::repeat::repeat(),
                commands::queue::queue(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.command_prefix.clone()),
                mention_as_prefix: true,
                ..Default::default()
            },
            event_handler: |ctx, event, _framework, data| {
                Box::pin(handle_event(ctx, event, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            let msg = error.to_string();
                            tracing::warn!("Command error: {msg}");
                            let _ = ctx.say(format!("❌ {msg}")).await;
                        }
                        other => {
                            if let Err(e) = poise::builtins::on_error(other).await {
                                tracing::error!("Error handling error: {e}");
                            }
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Bot is ready!");
                let music = MusicService::new(
                    queue_capacity,
                    Arc::new(YtDlpResolver::new(http_client)),
                    Arc::new(SongbirdTransport::new(setup_manager.clone())),
                    Arc::new(SongbirdGateway::new(setup_manager)),
                    Arc::new(ChannelNotifier::new(ctx.http.clone())),
                );
                Ok(Data { music })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .register_songbird_with(manager)
        .await
        .expect("Failed to create client");

    client.start().await.expect("Client error");
}
