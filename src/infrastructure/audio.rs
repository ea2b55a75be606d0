use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use dashmap::DashMap;
use poise::serenity_prelude::GuildId;
use regex::Regex;
use reqwest::Client;
use songbird::events::{Event, EventContext, EventHandler, TrackEvent};
use songbird::input::{Compose, Input, YoutubeDl};
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::Songbird;

use crate::domain::track::{PlayableHandle, ResolvedTrack};
use crate::services::error::{ResolveError, TransportError};
use crate::services::traits::{AudioTransport, CompletionSignal, TrackResolver};

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://\S+$").expect("static regex"));

fn best_audio_args() -> Vec<String> {
    vec!["-f".to_string(), "bestaudio".to_string()]
}

/// Resolves references with yt-dlp: URLs directly, anything else as a search.
pub struct YtDlpResolver {
    http: Client,
}

impl YtDlpResolver {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    pub fn is_url(reference: &str) -> bool {
        URL_RE.is_match(reference)
    }

    fn source(&self, reference: &str) -> YoutubeDl {
        let source = if Self::is_url(reference) {
            YoutubeDl::new(self.http.clone(), reference.to_string())
        } else {
            YoutubeDl::new_search(self.http.clone(), reference.to_string())
        };
        source.user_args(best_audio_args())
    }
}

#[async_trait]
impl TrackResolver for YtDlpResolver {
    async fn resolve(&self, reference: &str) -> Result<ResolvedTrack, ResolveError> {
        let mut source = self.source(reference);
        let metadata = source
            .aux_metadata()
            .await
            .map_err(|e| ResolveError::Source(e.to_string()))?;
        if metadata.source_url.is_none() && metadata.title.is_none() {
            return Err(ResolveError::NotFound(reference.to_string()));
        }

        let title = metadata.title.unwrap_or_else(|| reference.to_string());
        Ok(ResolvedTrack {
            title,
            handle: PlayableHandle::new(Input::from(source)),
        })
    }
}

/// Fires the loop's completion signal when songbird reports the track done.
struct CompletionNotifier {
    guild_id: GuildId,
    done: CompletionSignal,
}

#[async_trait]
impl EventHandler for CompletionNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        let outcome = match ctx {
            EventContext::Track(tracks) => match tracks.first().map(|(state, _)| &state.playing) {
                Some(PlayMode::Errored(e)) => Err(TransportError::Playback(format!("{e:?}"))),
                _ => Ok(()),
            },
            _ => Ok(()),
        };
        if self.done.complete(outcome) {
            tracing::debug!(guild_id = %self.guild_id, "Track completion delivered");
        }
        Some(Event::Cancel)
    }
}

/// Plays resolved inputs on the guild's songbird call.
pub struct SongbirdTransport {
    manager: Arc<Songbird>,
    current_tracks: DashMap<GuildId, TrackHandle>,
}

impl SongbirdTransport {
    pub fn new(manager: Arc<Songbird>) -> Self {
        Self {
            manager,
            current_tracks: DashMap::new(),
        }
    }
}

#[async_trait]
impl AudioTransport for SongbirdTransport {
    async fn play(
        &self,
        guild_id: GuildId,
        handle: PlayableHandle,
        done: CompletionSignal,
    ) -> Result<(), TransportError> {
        let input = handle
            .downcast::<Input>()
            .map_err(|_| TransportError::UnsupportedHandle)?;
        let call = self.manager.get(guild_id).ok_or(TransportError::NotConnected)?;

        let track = call.lock().await.play_only_input(input);
        for event in [TrackEvent::End, TrackEvent::Error] {
            track
                .add_event(
                    Event::Track(event),
                    CompletionNotifier {
                        guild_id,
                        done: done.clone(),
                    },
                )
                .map_err(|e| TransportError::Playback(e.to_string()))?;
        }
        self.current_tracks.insert(guild_id, track);
        Ok(())
    }

    async fn stop(&self, guild_id: GuildId) -> bool {
        match self.current_tracks.remove(&guild_id) {
            Some((_, track)) => track.stop().is_ok(),
            None => false,
        }
    }

    async fn is_playing(&self, guild_id: GuildId) -> bool {
        let Some(track) = self.current_tracks.get(&guild_id).map(|t| t.clone()) else {
            return false;
        };
        match track.get_info().await {
            Ok(info) => matches!(info.playing, PlayMode::Play | PlayMode::Pause),
            Err(_) => false,
        }
    }
}
