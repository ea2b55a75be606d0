use std::sync::Arc;

use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, GuildId, Http};
use songbird::Songbird;
use songbird::error::JoinError;

use crate::services::error::MusicError;
use crate::services::traits::{Notifier, VoiceGateway};

/// Voice connections through the songbird manager registered on the client.
pub struct SongbirdGateway {
    manager: Arc<Songbird>,
}

impl SongbirdGateway {
    pub fn new(manager: Arc<Songbird>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl VoiceGateway for SongbirdGateway {
    async fn current_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        let call = self.manager.get(guild_id)?;
        let channel = call.lock().await.current_channel()?;
        Some(ChannelId::new(channel.0.get()))
    }

    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), MusicError> {
        self.manager
            .join(guild_id, channel_id)
            .await
            .map(|_| ())
            .map_err(|e| MusicError::JoinError(e.to_string()))
    }

    async fn leave(&self, guild_id: GuildId) -> Result<(), MusicError> {
        match self.manager.remove(guild_id).await {
            Ok(()) | Err(JoinError::NoCall) => Ok(()),
            Err(e) => Err(MusicError::JoinError(e.to_string())),
        }
    }
}

/// Sends plain text replies to a channel over the serenity HTTP client.
pub struct ChannelNotifier {
    http: Arc<Http>,
}

impl ChannelNotifier {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn send(&self, target: ChannelId, text: &str) {
        if let Err(e) = target.say(&self.http, text).await {
            tracing::warn!(channel_id = %target, "Failed to send message: {e}");
        }
    }
}
