use std::sync::Arc;

use poise::serenity_prelude::{ChannelId, GuildId};

use crate::services::playback::PlaybackSession;
use crate::services::registry::GuildRegistry;

/// What a voice-presence change of the bot itself led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Started,
    AlreadyRunning,
    TornDown { cancelled: bool },
    Moved,
    Ignored,
}

/// Starts and tears down playback sessions as the bot joins and leaves voice.
#[derive(Clone)]
pub struct VoiceLifecycleController {
    registry: Arc<GuildRegistry>,
    session: PlaybackSession,
}

impl VoiceLifecycleController {
    pub fn new(registry: Arc<GuildRegistry>, session: PlaybackSession) -> Self {
        Self { registry, session }
    }

    pub async fn on_voice_state_change(
        &self,
        guild_id: GuildId,
        before: Option<ChannelId>,
        after: Option<ChannelId>,
    ) -> LifecycleAction {
        let action = match (before, after) {
            (None, Some(_)) => {
                let state = self.registry.get(guild_id);
                let mut guard = state.lock().await;
                if self.session.ensure_running(guild_id, &state, &mut guard) {
                    LifecycleAction::Started
                } else {
                    LifecycleAction::AlreadyRunning
                }
            }
            (Some(_), None) => {
                let cancelled = self
                    .registry
                    .reset_on_disconnect(guild_id, self.session.transport().as_ref())
                    .await;
                LifecycleAction::TornDown { cancelled }
            }
            (Some(from), Some(to)) if from != to => LifecycleAction::Moved,
            _ => LifecycleAction::Ignored,
        };

        match action {
            LifecycleAction::Started => tracing::info!(%guild_id, "Joined voice, playback session started"),
            LifecycleAction::TornDown { cancelled } => {
                tracing::info!(%guild_id, cancelled, "Left voice, guild state reset")
            }
            LifecycleAction::Moved => tracing::info!(%guild_id, "Moved voice channel"),
            LifecycleAction::AlreadyRunning | LifecycleAction::Ignored => {}
        }
        action
    }
}
