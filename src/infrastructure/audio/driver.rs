//! Audio Driver
//!
//! Abstraction over the platform audio player used for party playback

use std::fmt;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::value_objects::PlaybackStatus;

/// Stream of position reports for one loaded sound.
/// Ends after a `did_just_finish` report or when the sound is unloaded.
pub type StatusStream = BoxStream<'static, PlaybackStatus>;

/// Opaque handle to a sound loaded by a driver
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SoundHandle(String);

impl SoundHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SoundHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Audio driver error
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Invalid audio URI: {0}")]
    InvalidUri(String),
    #[error("Failed to load {uri}: {reason}")]
    Load { uri: String, reason: String },
    #[error("Unknown sound handle: {0}")]
    UnknownHandle(SoundHandle),
    #[error("Playback error: {0}")]
    Playback(String),
}

/// Audio driver trait
#[async_trait]
pub trait AudioDriver: Send + Sync {
    /// Load a sound from `uri`. The sound starts paused.
    async fn load(&self, uri: &str) -> Result<SoundHandle, AudioError>;

    /// Start or resume playback
    async fn play(&self, handle: &SoundHandle) -> Result<(), AudioError>;

    async fn pause(&self, handle: &SoundHandle) -> Result<(), AudioError>;

    /// Halt playback and rewind
    async fn stop(&self, handle: &SoundHandle) -> Result<(), AudioError>;

    /// Release the sound. The handle is invalid afterwards.
    async fn unload(&self, handle: &SoundHandle) -> Result<(), AudioError>;

    /// Subscribe to position reports for a loaded sound
    async fn subscribe(&self, handle: &SoundHandle) -> Result<StatusStream, AudioError>;
}

/// Accept `http(s)://` and `file://` URIs with something after the scheme
pub fn is_supported_uri(uri: &str) -> bool {
    ["http://", "https://", "file://"]
        .iter()
        .any(|scheme| uri.len() > scheme.len() && uri.starts_with(scheme))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_uris() {
        assert!(is_supported_uri("https://cdn.example/song.mp3"));
        assert!(is_supported_uri("http://localhost:8080/a.ogg"));
        assert!(is_supported_uri("file:///tmp/a.wav"));
        assert!(!is_supported_uri("https://"));
        assert!(!is_supported_uri("ftp://host/a.mp3"));
        assert!(!is_supported_uri("song.mp3"));
        assert!(!is_supported_uri(""));
    }
}
