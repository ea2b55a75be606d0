//! In-memory stand-ins for the chat platform and the audio backend.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use poise::serenity_prelude::{ChannelId, GuildId};

use crate::domain::track::{PlayableHandle, ResolvedTrack};
use crate::services::error::{MusicError, ResolveError, TransportError};
use crate::services::music_service::MusicService;
use crate::services::traits::{AudioTransport, CompletionSignal, Notifier, TrackResolver, VoiceGateway};

/// Resolves every reference to "Title of <reference>", except references
/// starting with `bad` which fail.
#[derive(Default)]
pub struct FakeResolver {
    pub delay: Option<Duration>,
}

#[async_trait]
impl TrackResolver for FakeResolver {
    async fn resolve(&self, reference: &str) -> Result<ResolvedTrack, ResolveError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if reference.starts_with("bad") {
            return Err(ResolveError::NotFound(reference.to_string()));
        }
        Ok(ResolvedTrack {
            title: format!("Title of {reference}"),
            handle: PlayableHandle::new(reference.to_string()),
        })
    }
}

#[derive(Default)]
struct TransportState {
    current: HashMap<GuildId, (String, CompletionSignal)>,
    played: Vec<(GuildId, String)>,
    max_concurrent: HashMap<GuildId, usize>,
}

/// Keeps every started track "playing" until the test finishes it or a
/// `stop` arrives. A second play on a guild whose track never completed is
/// recorded as overlapping playback. Handles whose reference starts with
/// `unplayable` are refused as if the voice connection were gone.
#[derive(Default)]
pub struct FakeTransport {
    state: Mutex<TransportState>,
    stop_delay: Option<Duration>,
}

impl FakeTransport {
    /// A transport whose `stop` takes `delay` before it cuts the track.
    pub fn with_stop_delay(delay: Duration) -> Self {
        Self {
            stop_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn finish(&self, guild_id: GuildId, outcome: Result<(), TransportError>) -> bool {
        let current = self.state.lock().current.remove(&guild_id);
        match current {
            Some((_, signal)) => signal.complete(outcome),
            None => false,
        }
    }

    pub fn current(&self, guild_id: GuildId) -> Option<String> {
        self.state.lock().current.get(&guild_id).map(|(r, _)| r.clone())
    }

    pub fn played(&self, guild_id: GuildId) -> Vec<String> {
        self.state
            .lock()
            .played
            .iter()
            .filter(|(g, _)| *g == guild_id)
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn max_concurrent(&self, guild_id: GuildId) -> usize {
        self.state.lock().max_concurrent.get(&guild_id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl AudioTransport for FakeTransport {
    async fn play(
        &self,
        guild_id: GuildId,
        handle: PlayableHandle,
        done: CompletionSignal,
    ) -> Result<(), TransportError> {
        let reference = handle
            .downcast::<String>()
            .map_err(|_| TransportError::UnsupportedHandle)?;
        if reference.starts_with("unplayable") {
            return Err(TransportError::NotConnected);
        }
        let mut state = self.state.lock();
        let overlapping = state
            .current
            .get(&guild_id)
            .is_some_and(|(_, signal)| !signal.is_complete());
        let concurrent = if overlapping { 2 } else { 1 };
        let max = state.max_concurrent.entry(guild_id).or_default();
        *max = (*max).max(concurrent);
        state.played.push((guild_id, reference.clone()));
        state.current.insert(guild_id, (reference, done));
        Ok(())
    }

    async fn stop(&self, guild_id: GuildId) -> bool {
        if let Some(delay) = self.stop_delay {
            tokio::time::sleep(delay).await;
        }
        self.finish(guild_id, Ok(()))
    }

    async fn is_playing(&self, guild_id: GuildId) -> bool {
        self.state
            .lock()
            .current
            .get(&guild_id)
            .is_some_and(|(_, signal)| !signal.is_complete())
    }
}

#[derive(Default)]
pub struct FakeGateway {
    channels: Mutex<HashMap<GuildId, ChannelId>>,
    pub joins: Mutex<Vec<(GuildId, ChannelId)>>,
    pub leaves: Mutex<Vec<GuildId>>,
}

#[async_trait]
impl VoiceGateway for FakeGateway {
    async fn current_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        self.channels.lock().get(&guild_id).copied()
    }

    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), MusicError> {
        self.channels.lock().insert(guild_id, channel_id);
        self.joins.lock().push((guild_id, channel_id));
        Ok(())
    }

    async fn leave(&self, guild_id: GuildId) -> Result<(), MusicError> {
        self.channels.lock().remove(&guild_id);
        self.leaves.lock().push(guild_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    messages: Mutex<Vec<(ChannelId, String)>>,
}

impl FakeNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.messages.lock().iter().filter(|(_, m)| m.contains(needle)).count()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, target: ChannelId, text: &str) {
        self.messages.lock().push((target, text.to_string()));
    }
}

pub struct Harness {
    pub service: MusicService,
    pub transport: Arc<FakeTransport>,
    pub gateway: Arc<FakeGateway>,
    pub notifier: Arc<FakeNotifier>,
}

impl Harness {
    pub fn new(capacity: usize) -> Self {
        Self::with_resolver(capacity, FakeResolver::default())
    }

    pub fn with_resolver(capacity: usize, resolver: FakeResolver) -> Self {
        Self::build(capacity, resolver, FakeTransport::default())
    }

    pub fn with_transport(capacity: usize, transport: FakeTransport) -> Self {
        Self::build(capacity, FakeResolver::default(), transport)
    }

    fn build(capacity: usize, resolver: FakeResolver, transport: FakeTransport) -> Self {
        let resolver = Arc::new(resolver);
        let transport = Arc::new(transport);
        let gateway = Arc::new(FakeGateway::default());
        let notifier = Arc::new(FakeNotifier::default());
        let service = MusicService::new(
            capacity,
            resolver,
            transport.clone(),
            gateway.clone(),
            notifier.clone(),
        );
        Self {
            service,
            transport,
            gateway,
            notifier,
        }
    }
}

/// Polls `check` until it holds, failing the test after two seconds.
pub async fn eventually<F, Fut>(what: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let waited = tokio::time::timeout(Duration::from_secs(2), async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "timed out waiting for: {what}");
}
