use serde::{Deserialize, Serialize};

/// Playback state as seen by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        }
    }

    /// Derive the state from the current-song and playing flags
    pub fn from_flags(has_current_song: bool, is_playing: bool) -> Self {
        match (has_current_song, is_playing) {
            (false, _) => PlaybackState::Idle,
            (true, true) => PlaybackState::Playing,
            (true, false) => PlaybackState::Paused,
        }
    }
}

/// Position report emitted by an audio driver while a sound is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStatus {
    pub position_millis: u64,
    pub did_just_finish: bool,
}

impl PlaybackStatus {
    pub fn at(position_millis: u64) -> Self {
        Self {
            position_millis,
            did_just_finish: false,
        }
    }

    pub fn finished(position_millis: u64) -> Self {
        Self {
            position_millis,
            did_just_finish: true,
        }
    }

    pub fn position_secs(&self) -> f64 {
        self.position_millis as f64 / 1000.0
    }
}
