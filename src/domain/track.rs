use std::any::Any;
use std::fmt;

use poise::serenity_prelude::ChannelId;

/// A song as the user asked for it: a URL or a free-text search query,
/// together with the text channel that should hear about its progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRequest {
    pub reference: String,
    pub reply_target: ChannelId,
}

impl TrackRequest {
    pub fn new(reference: impl Into<String>, reply_target: ChannelId) -> Self {
        Self {
            reference: reference.into(),
            reply_target,
        }
    }
}

/// Opaque audio source produced by a resolver. Only the transport that
/// understands the concrete type can turn it back into something playable.
pub struct PlayableHandle(Box<dyn Any + Send>);

impl PlayableHandle {
    pub fn new<T: Any + Send>(source: T) -> Self {
        Self(Box::new(source))
    }

    /// Recovers the concrete source, handing the handle back on a type mismatch.
    pub fn downcast<T: Any + Send>(self) -> Result<T, Self> {
        match self.0.downcast::<T>() {
            Ok(source) => Ok(*source),
            Err(other) => Err(Self(other)),
        }
    }
}

impl fmt::Debug for PlayableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlayableHandle(..)")
    }
}

/// Result of resolving a [`TrackRequest`]. Lives for exactly one play-through.
#[derive(Debug)]
pub struct ResolvedTrack {
    pub title: String,
    pub handle: PlayableHandle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_round_trips_its_concrete_type() {
        let handle = PlayableHandle::new(String::from("stream"));
        assert_eq!(handle.downcast::<String>().unwrap(), "stream");
    }

    #[test]
    fn handle_downcast_to_wrong_type_returns_it() {
        let handle = PlayableHandle::new(7_u32);
        let handle = handle.downcast::<String>().unwrap_err();
        assert_eq!(handle.downcast::<u32>().unwrap(), 7);
    }
}
