//! Seams to the outside world. The scheduler only talks to the chat platform
//! and the audio backend through these traits; `infrastructure` provides the
//! songbird/serenity implementations.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use poise::serenity_prelude::{ChannelId, GuildId};
use tokio::sync::oneshot;

use crate::domain::track::{PlayableHandle, ResolvedTrack};
use crate::services::error::{MusicError, ResolveError, TransportError};

pub type TrackOutcome = Result<(), TransportError>;

/// Sending half of the one-shot "track finished" event.
///
/// Clones share the same slot: whichever of the end/error callbacks fires
/// first delivers the outcome, later calls are ignored.
#[derive(Clone)]
pub struct CompletionSignal {
    slot: Arc<Mutex<Option<oneshot::Sender<TrackOutcome>>>>,
}

impl CompletionSignal {
    pub fn new() -> (Self, oneshot::Receiver<TrackOutcome>) {
        let (tx, rx) = oneshot::channel();
        let signal = Self {
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (signal, rx)
    }

    /// Returns `false` if the signal had already fired.
    pub fn complete(&self, outcome: TrackOutcome) -> bool {
        match self.slot.lock().take() {
            Some(tx) => {
                // The loop may already be gone (cancelled); nothing to deliver to.
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.slot.lock().is_none()
    }
}

#[async_trait]
pub trait TrackResolver: Send + Sync {
    async fn resolve(&self, reference: &str) -> Result<ResolvedTrack, ResolveError>;
}

#[async_trait]
pub trait AudioTransport: Send + Sync {
    /// Starts playing `handle` on the guild's voice session. `done` must be
    /// completed exactly once when the track ends, is stopped, or fails.
    async fn play(
        &self,
        guild_id: GuildId,
        handle: PlayableHandle,
        done: CompletionSignal,
    ) -> Result<(), TransportError>;

    /// Stops the current track. Returns whether anything was playing.
    async fn stop(&self, guild_id: GuildId) -> bool;

    async fn is_playing(&self, guild_id: GuildId) -> bool;
}

#[async_trait]
pub trait VoiceGateway: Send + Sync {
    async fn current_channel(&self, guild_id: GuildId) -> Option<ChannelId>;

    /// Connects to `channel_id`, or moves there if already connected.
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), MusicError>;

    async fn leave(&self, guild_id: GuildId) -> Result<(), MusicError>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, target: ChannelId, text: &str);
}
