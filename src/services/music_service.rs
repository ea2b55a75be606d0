use std::sync::Arc;

use poise::serenity_prelude::{ChannelId, GuildId};

use crate::domain::track::TrackRequest;
use crate::services::error::MusicError;
use crate::services::lifecycle::VoiceLifecycleController;
use crate::services::playback::PlaybackSession;
use crate::services::registry::GuildRegistry;
use crate::services::traits::{AudioTransport, Notifier, TrackResolver, VoiceGateway};

/// Snapshot of a guild's queue for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub now_playing: Option<TrackRequest>,
    pub pending: Vec<TrackRequest>,
    pub repeat: bool,
}

/// Result of a `stop`: how many pending tracks were dropped and whether a
/// track was cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopOutcome {
    pub drained: usize,
    pub stopped: bool,
}

/// The operations the chat commands invoke. Every operation that touches a
/// guild's state holds that guild's mutex for its whole duration.
pub struct MusicService {
    registry: Arc<GuildRegistry>,
    session: PlaybackSession,
    gateway: Arc<dyn VoiceGateway>,
    lifecycle: VoiceLifecycleController,
}

impl MusicService {
    pub fn new(
        capacity: usize,
        resolver: Arc<dyn TrackResolver>,
        transport: Arc<dyn AudioTransport>,
        gateway: Arc<dyn VoiceGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let registry = Arc::new(GuildRegistry::new(capacity));
        let session = PlaybackSession::new(resolver, transport, notifier);
        let lifecycle = VoiceLifecycleController::new(registry.clone(), session.clone());
        Self {
            registry,
            session,
            gateway,
            lifecycle,
        }
    }

    pub fn registry(&self) -> &Arc<GuildRegistry> {
        &self.registry
    }

    pub fn lifecycle(&self) -> &VoiceLifecycleController {
        &self.lifecycle
    }

    /// Joins `channel`, or the author's channel when none is given. Moves
    /// the bot if it is already connected elsewhere.
    pub async fn join(
        &self,
        guild_id: GuildId,
        author_channel: Option<ChannelId>,
        channel: Option<ChannelId>,
    ) -> Result<ChannelId, MusicError> {
        let target = channel.or(author_channel).ok_or(MusicError::NotInVoiceChannel)?;
        let state = self.registry.get(guild_id);
        let _guard = state.lock().await;
        if self.gateway.current_channel(guild_id).await != Some(target) {
            self.gateway.join(guild_id, target).await?;
        }
        Ok(target)
    }

    /// Queues `reference`, connecting to the author's channel first if the
    /// bot is not in voice. Returns the queue length after the insert.
    pub async fn play(
        &self,
        guild_id: GuildId,
        author_channel: Option<ChannelId>,
        reference: &str,
        reply_target: ChannelId,
    ) -> Result<usize, MusicError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(MusicError::InvalidReference);
        }

        let state = self.registry.get(guild_id);
        let mut guard = state.lock().await;

        // Checked up front so a full queue neither joins voice nor changes state.
        if guard.queue.len() >= guard.queue.capacity() {
            return Err(MusicError::QueueFull(guard.queue.capacity()));
        }

        if self.gateway.current_channel(guild_id).await.is_none() {
            let channel = author_channel.ok_or(MusicError::NotInVoiceChannel)?;
            self.gateway.join(guild_id, channel).await?;
        }

        guard
            .queue
            .enqueue(TrackRequest::new(reference, reply_target))
            .map_err(|e| MusicError::QueueFull(e.capacity))?;
        let queued = guard.queue.len();
        self.session.ensure_running(guild_id, &state, &mut guard);

        tracing::info!(%guild_id, reference, queued, "Track queued");
        Ok(queued)
    }

    /// Stops the current track, which lets the loop advance as if it had
    /// ended. Returns `false` when nothing was playing.
    pub async fn skip(&self, guild_id: GuildId) -> bool {
        let state = self.registry.get(guild_id);
        let _guard = state.lock().await;
        let transport = self.session.transport();
        if !transport.is_playing(guild_id).await {
            return false;
        }
        transport.stop(guild_id).await
    }

    /// Clears the queue and cuts the current track as one step.
    pub async fn stop(&self, guild_id: GuildId) -> StopOutcome {
        let state = self.registry.get(guild_id);
        let mut guard = state.lock().await;
        let drained = guard.queue.drain_all();
        let stopped = self.session.transport().stop(guild_id).await;
        tracing::info!(%guild_id, drained, stopped, "Playback stopped");
        StopOutcome { drained, stopped }
    }

    /// Tears the guild down and leaves voice. The voice-leave event that
    /// follows finds no loop left to cancel.
    pub async fn disconnect(&self, guild_id: GuildId) -> Result<(), MusicError> {
        let state = self.registry.get(guild_id);
        let mut guard = state.lock().await;
        guard.reset().await;
        self.session.transport().stop(guild_id).await;
        self.gateway.leave(guild_id).await
    }

    pub async fn toggle_repeat(&self, guild_id: GuildId) -> bool {
        let state = self.registry.get(guild_id);
        let repeat = state.lock().await.queue.toggle_repeat();
        tracing::info!(%guild_id, repeat, "Repeat toggled");
        repeat
    }

    pub async fn snapshot(&self, guild_id: GuildId) -> QueueSnapshot {
        let state = self.registry.get(guild_id);
        let guard = state.lock().await;
        QueueSnapshot {
            now_playing: guard.now_playing.clone(),
            pending: guard.queue.iter().cloned().collect(),
            repeat: guard.queue.repeat(),
        }
    }
}
