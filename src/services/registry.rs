use std::sync::Arc;

use dashmap::DashMap;
use poise::serenity_prelude::GuildId;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::domain::queue::GuildQueue;
use crate::domain::track::TrackRequest;
use crate::services::traits::AudioTransport;

/// Ownership handle for a guild's running playback loop.
#[derive(Debug)]
pub struct PlaybackTask {
    pub(crate) id: u64,
    pub(crate) cancel: CancellationToken,
    pub(crate) handle: JoinHandle<()>,
}

impl PlaybackTask {
    /// Interrupts the loop wherever it is suspended and waits for it to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            if e.is_panic() {
                tracing::error!("Playback loop panicked: {e}");
            }
        }
    }
}

/// Everything the bot keeps for one guild. Always accessed through the
/// guild's mutex in [`GuildRegistry`].
#[derive(Debug)]
pub struct GuildState {
    pub queue: GuildQueue,
    pub now_playing: Option<TrackRequest>,
    task: Option<PlaybackTask>,
}

impl GuildState {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: GuildQueue::new(capacity),
            now_playing: None,
            task: None,
        }
    }

    pub fn has_task(&self) -> bool {
        self.task.is_some()
    }

    pub(crate) fn install_task(&mut self, task: PlaybackTask) {
        debug_assert!(self.task.is_none(), "a guild may only run one playback loop");
        self.task = Some(task);
    }

    /// Called by the loop itself when it runs out of work. A loop that was
    /// already replaced must not clear its successor's slot.
    pub(crate) fn release_task(&mut self, id: u64) -> bool {
        match &self.task {
            Some(task) if task.id == id => {
                self.task = None;
                true
            }
            _ => false,
        }
    }

    /// Cancels the running loop (if any) and starts over with an empty
    /// queue and repeat off. Returns whether a loop was cancelled.
    pub async fn reset(&mut self) -> bool {
        let task = self.task.take();
        *self = GuildState::new(self.queue.capacity());
        match task {
            Some(task) => {
                task.shutdown().await;
                true
            }
            None => false,
        }
    }
}

/// Per-guild state map. Each guild has its own lock, so a busy guild never
/// blocks commands in another one. Entries are never removed, which keeps
/// the mutex stable for the whole life of the process.
pub struct GuildRegistry {
    guilds: DashMap<GuildId, Arc<Mutex<GuildState>>>,
    capacity: usize,
}

impl GuildRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            guilds: DashMap::new(),
            capacity,
        }
    }

    pub fn get(&self, guild_id: GuildId) -> Arc<Mutex<GuildState>> {
        self.guilds
            .entry(guild_id)
            .or_insert_with(|| Arc::new(Mutex::new(GuildState::new(self.capacity))))
            .clone()
    }

    /// Resets the guild and silences its transport under one hold of the
    /// guild lock. A `play` waiting on that lock starts its session only
    /// after the stop has landed, so the stop never cuts the new track.
    pub async fn reset_on_disconnect(&self, guild_id: GuildId, transport: &dyn AudioTransport) -> bool {
        let state = self.get(guild_id);
        let mut guard = state.lock().await;
        let cancelled = guard.reset().await;
        transport.stop(guild_id).await;
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use poise::serenity_prelude::ChannelId;

    use super::*;
    use crate::services::testing::FakeTransport;

    fn parked_task(id: u64) -> (PlaybackTask, tokio::sync::oneshot::Receiver<()>) {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let (exited_tx, exited_rx) = tokio::sync::oneshot::channel();
        let handle = tokio::spawn(async move {
            token.cancelled().await;
            let _ = exited_tx.send(());
        });
        (PlaybackTask { id, cancel, handle }, exited_rx)
    }

    #[tokio::test]
    async fn get_creates_once_per_guild() {
        let registry = GuildRegistry::new(5);
        let a = registry.get(GuildId::new(1));
        let b = registry.get(GuildId::new(1));
        let c = registry.get(GuildId::new(2));

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(a.lock().await.queue.capacity(), 5);
    }

    #[tokio::test]
    async fn reset_cancels_task_and_clears_state() {
        let registry = GuildRegistry::new(5);
        let guild = GuildId::new(1);
        let (task, exited) = parked_task(1);
        {
            let state = registry.get(guild);
            let mut guard = state.lock().await;
            guard.queue.enqueue(TrackRequest::new("a", ChannelId::new(9))).unwrap();
            guard.queue.toggle_repeat();
            guard.install_task(task);
        }

        assert!(registry.reset_on_disconnect(guild, &FakeTransport::default()).await);
        tokio::time::timeout(Duration::from_secs(1), exited)
            .await
            .expect("task should exit")
            .unwrap();

        let state = registry.get(guild);
        let guard = state.lock().await;
        assert!(guard.queue.is_empty());
        assert!(!guard.queue.repeat());
        assert!(!guard.has_task());
    }

    #[tokio::test]
    async fn reset_without_task_is_noop() {
        let registry = GuildRegistry::new(5);
        let transport = FakeTransport::default();
        assert!(!registry.reset_on_disconnect(GuildId::new(3), &transport).await);
        assert!(!registry.reset_on_disconnect(GuildId::new(3), &transport).await);
    }

    #[tokio::test]
    async fn stale_loop_cannot_release_newer_task() {
        let mut state = GuildState::new(5);
        let (task, _exited) = parked_task(2);
        state.install_task(task);

        assert!(!state.release_task(1));
        assert!(state.has_task());
        assert!(state.release_task(2));
        assert!(!state.has_task());
    }
}
