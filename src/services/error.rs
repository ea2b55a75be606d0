#[derive(Debug, thiserror::Error)]
pub enum MusicError {
    #[error("You are not connected to a voice channel.")]
    NotInVoiceChannel,
    #[error("This command must be used in a server")]
    NotInGuild,
    #[error("The queue is full (max {0} songs).")]
    QueueFull(usize),
    #[error("The queue is empty")]
    EmptyQueue,
    #[error("Please give a song link or search query")]
    InvalidReference,
    #[error("Failed to join voice channel: {0}")]
    JoinError(String),
}

/// A reference that could not be turned into playable media.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no results for `{0}`")]
    NotFound(String),
    #[error("{0}")]
    Source(String),
}

/// Runtime failure reported by the playback backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("not connected to voice in this server")]
    NotConnected,
    #[error("resolved track has an unsupported source type")]
    UnsupportedHandle,
    #[error("playback failed: {0}")]
    Playback(String),
}
