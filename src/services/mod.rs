pub mod error;
pub mod lifecycle;
pub mod music_service;
pub mod playback;
pub mod registry;
#[cfg(test)]
pub mod testing;
pub mod traits;
