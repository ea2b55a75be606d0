pub mod audio;
pub mod voice;
