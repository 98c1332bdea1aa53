use serde::{Deserialize, Serialize};

use crate::domain::entities::{Member, Party, Song};
use crate::domain::value_objects::PlaybackState;

/// Read-only view of the store handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySnapshot {
    pub party: Option<Party>,
    pub user: Option<Member>,
    pub is_host: bool,
    pub is_playing: bool,
    /// Seconds into the current song
    pub current_time: f64,
    /// Increases by one with every published change
    pub revision: u64,
}

impl PartySnapshot {
    pub fn current_song(&self) -> Option<&Song> {
        self.party.as_ref().and_then(|p| p.current_song.as_ref())
    }

    pub fn queue(&self) -> &[Song] {
        self.party.as_ref().map(|p| p.queue.as_slice()).unwrap_or(&[])
    }

    pub fn playback_state(&self) -> PlaybackState {
        PlaybackState::from_flags(self.current_song().is_some(), self.is_playing)
    }

    /// Fraction of the current song played, 0 when idle
    pub fn progress(&self) -> f64 {
        self.current_song()
            .map(|song| song.progress(self.current_time))
            .unwrap_or(0.0)
    }
}
