use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use poise::serenity_prelude::GuildId;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::domain::track::TrackRequest;
use crate::services::registry::{GuildState, PlaybackTask};
use crate::services::traits::{AudioTransport, CompletionSignal, Notifier, TrackResolver};

/// Runs the per-guild playback loop: dequeue, resolve, play, wait for the
/// track to end, repeat until the queue is empty.
///
/// The whole loop body runs inside a `select!` against the task's
/// cancellation token, so a teardown interrupts it at whatever await it is
/// parked on (resolution, the guild lock, or the completion wait).
#[derive(Clone)]
pub struct PlaybackSession {
    resolver: Arc<dyn TrackResolver>,
    transport: Arc<dyn AudioTransport>,
    notifier: Arc<dyn Notifier>,
    next_task_id: Arc<AtomicU64>,
}

impl PlaybackSession {
    pub fn new(
        resolver: Arc<dyn TrackResolver>,
        transport: Arc<dyn AudioTransport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            resolver,
            transport,
            notifier,
            next_task_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn transport(&self) -> &Arc<dyn AudioTransport> {
        &self.transport
    }

    /// Spawns a loop for the guild unless one is already running.
    ///
    /// `guard` must be the locked `state`; holding it across the
    /// check-and-spawn is what keeps a guild at one loop.
    pub fn ensure_running(
        &self,
        guild_id: GuildId,
        state: &Arc<Mutex<GuildState>>,
        guard: &mut GuildState,
    ) -> bool {
        if guard.has_task() {
            return false;
        }

        let id = self.next_task_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(self.clone().run(guild_id, state.clone(), id, cancel.clone()));
        guard.install_task(PlaybackTask { id, cancel, handle });
        tracing::debug!(%guild_id, task = id, "Playback loop started");
        true
    }

    async fn run(
        self,
        guild_id: GuildId,
        state: Arc<Mutex<GuildState>>,
        id: u64,
        cancel: CancellationToken,
    ) {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(%guild_id, task = id, "Playback loop cancelled");
            }
            _ = self.drive(guild_id, &state, id) => {
                tracing::debug!(%guild_id, task = id, "Queue drained, playback loop idle");
            }
        }
    }

    async fn drive(&self, guild_id: GuildId, state: &Mutex<GuildState>, id: u64) {
        loop {
            let (request, epoch) = {
                let mut guard = state.lock().await;
                match guard.queue.dequeue() {
                    Some(request) => {
                        guard.now_playing = Some(request.clone());
                        (request, guard.queue.epoch())
                    }
                    None => {
                        guard.now_playing = None;
                        guard.release_task(id);
                        return;
                    }
                }
            };

            let played = self.play_one(guild_id, state, &request, epoch).await;

            let mut guard = state.lock().await;
            guard.now_playing = None;
            let repeat = played && guard.queue.repeat() && guard.queue.epoch() == epoch;
            if repeat && !guard.queue.requeue(request) {
                tracing::warn!(%guild_id, "Queue full, dropping repeated track");
            }
        }
    }

    /// Plays a single request to completion. Returns `false` when the track
    /// never started, which keeps it out of the repeat rotation.
    ///
    /// A drain while the track was resolving (a `stop` or `clear`) discards
    /// it. The epoch check and the transport start share one hold of the
    /// guild lock, so a `stop` either sees the track playing or prevents it.
    async fn play_one(
        &self,
        guild_id: GuildId,
        state: &Mutex<GuildState>,
        request: &TrackRequest,
        epoch: u64,
    ) -> bool {
        let track = match self.resolver.resolve(&request.reference).await {
            Ok(track) => track,
            Err(e) => {
                tracing::warn!(%guild_id, reference = %request.reference, "Failed to resolve track: {e}");
                self.notifier
                    .send(
                        request.reply_target,
                        &format!("Could not play `{}`: {e}", request.reference),
                    )
                    .await;
                return false;
            }
        };

        let (done, finished) = CompletionSignal::new();
        let started = {
            let guard = state.lock().await;
            if guard.queue.epoch() != epoch {
                tracing::debug!(%guild_id, title = %track.title, "Queue cleared while resolving, track dropped");
                return false;
            }
            self.transport.play(guild_id, track.handle, done).await
        };
        if let Err(e) = started {
            tracing::error!(%guild_id, title = %track.title, "Failed to start playback: {e}");
            self.notifier
                .send(
                    request.reply_target,
                    &format!("Could not play `{}`: {e}", request.reference),
                )
                .await;
            return false;
        }

        tracing::info!(%guild_id, title = %track.title, "Now playing");
        self.notifier
            .send(request.reply_target, &format!("Now playing: {}", track.title))
            .await;

        match finished.await {
            Ok(Ok(())) => tracing::debug!(%guild_id, title = %track.title, "Track finished"),
            Ok(Err(e)) => tracing::error!(%guild_id, title = %track.title, "Track ended with error: {e}"),
            Err(_) => tracing::error!(%guild_id, title = %track.title, "Transport dropped the completion signal"),
        }
        true
    }
}
