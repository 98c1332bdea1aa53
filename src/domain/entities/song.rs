use serde::{Deserialize, Serialize};

/// Language tag shown on catalog and queue entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SongLanguage {
    English,
    Hindi,
    Telugu,
    Tamil,
    Kannada,
}

impl SongLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SongLanguage::English => "English",
            SongLanguage::Hindi => "Hindi",
            SongLanguage::Telugu => "Telugu",
            SongLanguage::Tamil => "Tamil",
            SongLanguage::Kannada => "Kannada",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "English" => Some(SongLanguage::English),
            "Hindi" => Some(SongLanguage::Hindi),
            "Telugu" => Some(SongLanguage::Telugu),
            "Tamil" => Some(SongLanguage::Tamil),
            "Kannada" => Some(SongLanguage::Kannada),
            _ => None,
        }
    }
}

/// A playable track as offered by the catalog, before anyone queues it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album_art: String,
    /// Length in seconds
    pub duration: u32,
    pub language: SongLanguage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// Queue entry. Only `votes` changes after the song is queued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album_art: String,
    pub duration: u32,
    pub language: SongLanguage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub votes: u32,
    pub added_by: String,
    /// Epoch milliseconds
    pub added_at: i64,
    /// Position in the party's insertion order, assigned on enqueue
    #[serde(default)]
    pub seq: u64,
}

impl Song {
    /// Queue a track on behalf of `added_by`, starting with zero votes
    pub fn queued(track: Track, added_by: &str, added_at: i64) -> Self {
        Self {
            id: track.id,
            title: track.title,
            artist: track.artist,
            album_art: track.album_art,
            duration: track.duration,
            language: track.language,
            audio_url: track.audio_url,
            votes: 0,
            added_by: added_by.to_string(),
            added_at,
            seq: 0,
        }
    }

    /// Fraction of the song elapsed at `current_time` seconds, clamped to [0, 1]
    pub fn progress(&self, current_time: f64) -> f64 {
        if self.duration == 0 || !current_time.is_finite() {
            return 0.0;
        }
        (current_time / self.duration as f64).clamp(0.0, 1.0)
    }
}

/// Format seconds as `m:ss` for the now-playing card
pub fn format_playback_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> Track {
        Track {
            id: "t1".into(),
            title: "Naatu Naatu".into(),
            artist: "Rahul Sipligunj".into(),
            album_art: "https://img.example/naatu.jpg".into(),
            duration: 200,
            language: SongLanguage::Telugu,
            audio_url: None,
        }
    }

    #[test]
    fn test_queued_song_starts_with_zero_votes() {
        let song = Song::queued(track(), "Ana", 1_000);
        assert_eq!(song.votes, 0);
        assert_eq!(song.added_by, "Ana");
        assert_eq!(song.added_at, 1_000);
        assert_eq!(song.language, SongLanguage::Telugu);
    }

    #[test]
    fn test_progress_is_clamped() {
        let song = Song::queued(track(), "Ana", 0);
        assert_eq!(song.progress(50.0), 0.25);
        assert_eq!(song.progress(500.0), 1.0);
        assert_eq!(song.progress(-3.0), 0.0);
        assert_eq!(song.progress(f64::NAN), 0.0);

        let mut silent = song.clone();
        silent.duration = 0;
        assert_eq!(silent.progress(10.0), 0.0);
    }

    #[test]
    fn test_format_playback_time() {
        assert_eq!(format_playback_time(0.0), "0:00");
        assert_eq!(format_playback_time(9.9), "0:09");
        assert_eq!(format_playback_time(61.0), "1:01");
        assert_eq!(format_playback_time(754.2), "12:34");
        assert_eq!(format_playback_time(-4.0), "0:00");
    }

    #[test]
    fn test_language_wire_format() {
        let json = serde_json::to_string(&SongLanguage::Kannada).unwrap();
        assert_eq!(json, "\"Kannada\"");
        assert_eq!(SongLanguage::from_str("Hindi"), Some(SongLanguage::Hindi));
        assert_eq!(SongLanguage::from_str("French"), None);
    }
}
