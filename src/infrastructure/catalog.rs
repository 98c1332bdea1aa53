//! Song catalog guests pick from when adding to the queue

use crate::domain::entities::{SongLanguage, Track};

/// In-memory catalog of tracks
#[derive(Debug, Clone, Default)]
pub struct SongCatalog {
    tracks: Vec<Track>,
}

impl SongCatalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Load a catalog from a JSON array of tracks
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn all(&self) -> &[Track] {
        &self.tracks
    }

    pub fn find(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Case-insensitive match on title or artist. A blank query returns everything.
    pub fn search(&self, query: &str) -> Vec<&Track> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.tracks.iter().collect();
        }
        self.tracks
            .iter()
            .filter(|t| {
                t.title.to_lowercase().contains(&needle)
                    || t.artist.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn by_language(&self, language: SongLanguage) -> Vec<&Track> {
        self.tracks.iter().filter(|t| t.language == language).collect()
    }

    /// Small built-in catalog for demos
    pub fn sample() -> Self {
        let track = |id: &str, title: &str, artist: &str, duration: u32, language| Track {
            id: id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            album_art: format!("https://images.festifypro.app/{}.jpg", id),
            duration,
            language,
            audio_url: Some(format!(
                "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-{}.mp3",
                &id[1..]
            )),
        };

        Self::new(vec![
            track("s1", "Blinding Lights", "The Weeknd", 200, SongLanguage::English),
            track("s2", "Kesariya", "Arijit Singh", 268, SongLanguage::Hindi),
            track("s3", "Naatu Naatu", "Rahul Sipligunj", 216, SongLanguage::Telugu),
            track("s4", "Arabic Kuthu", "Anirudh Ravichander", 279, SongLanguage::Tamil),
            track("s5", "Bombe Helutaite", "Vijay Prakash", 255, SongLanguage::Kannada),
            track("s6", "Levitating", "Dua Lipa", 203, SongLanguage::English),
        ])
    }
}
