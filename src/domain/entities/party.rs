use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{Member, Song};
use crate::domain::services::{apply_vote, VoteDirection};
use crate::domain::value_objects::PartyCode;

/// Host id used for parties fabricated by a demo join
pub const DEMO_HOST_ID: &str = "demo-host";

/// Base URL for invite links
pub const JOIN_LINK_BASE: &str = "https://festifypro.app/join";

/// Party entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: String,
    pub code: PartyCode,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub host_id: String,
    pub host_name: String,
    /// Epoch milliseconds
    pub created_at: i64,
    pub members: Vec<Member>,
    /// Play order, highest votes first
    pub queue: Vec<Song>,
    pub current_song: Option<Song>,
    pub is_playing: bool,
    /// Seconds into `current_song`
    pub current_time: f64,
    /// Sequence number handed to the next queued song
    #[serde(default)]
    pub next_seq: u64,
}

impl Party {
    /// Create a new party with `host` as its sole member
    pub fn new(code: PartyCode, title: String, host: Member) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            code,
            title,
            city: None,
            date: None,
            time: None,
            host_id: host.id.clone(),
            host_name: host.name.clone(),
            created_at: chrono::Utc::now().timestamp_millis(),
            members: vec![host],
            queue: Vec::new(),
            current_song: None,
            is_playing: false,
            current_time: 0.0,
            next_seq: 0,
        }
    }

    /// Placeholder party for a join that found nothing to join.
    /// The host is not a member; `guest` is the only one.
    pub fn demo(code: PartyCode, title: String, host_name: String, guest: Member) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            code,
            title,
            city: None,
            date: None,
            time: None,
            host_id: DEMO_HOST_ID.to_string(),
            host_name,
            created_at: chrono::Utc::now().timestamp_millis(),
            members: vec![guest],
            queue: Vec::new(),
            current_song: None,
            is_playing: false,
            current_time: 0.0,
            next_seq: 0,
        }
    }

    pub fn with_schedule(
        mut self,
        city: Option<String>,
        date: Option<String>,
        time: Option<String>,
    ) -> Self {
        self.city = city;
        self.date = date;
        self.time = time;
        self
    }

    /// The hosting member, if present in the roster
    pub fn host(&self) -> Option<&Member> {
        self.members.iter().find(|m| m.id == self.host_id)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn has_member(&self, member_id: &str) -> bool {
        self.members.iter().any(|m| m.id == member_id)
    }

    /// Append a member unless one with the same id is already present
    pub fn add_member(&mut self, member: Member) -> bool {
        if self.has_member(&member.id) {
            return false;
        }
        self.members.push(member);
        true
    }

    pub fn remove_member(&mut self, member_id: &str) -> Option<Member> {
        let index = self.members.iter().position(|m| m.id == member_id)?;
        Some(self.members.remove(index))
    }

    /// Queue a song at the tail, stamping its insertion sequence
    pub fn enqueue(&mut self, mut song: Song) {
        song.seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(song);
    }

    /// Vote on a queued song and re-rank. Returns the new vote count.
    pub fn vote(&mut self, song_id: &str, direction: VoteDirection) -> Option<u32> {
        apply_vote(&mut self.queue, song_id, direction)
    }

    /// Move the queue head into `current_song`.
    ///
    /// With an empty queue the party goes idle and `None` is returned.
    pub fn advance(&mut self) -> Option<&Song> {
        self.current_time = 0.0;
        if self.queue.is_empty() {
            self.current_song = None;
            self.is_playing = false;
            return None;
        }
        self.current_song = Some(self.queue.remove(0));
        self.is_playing = true;
        self.current_song.as_ref()
    }

    pub fn join_link(&self) -> String {
        format!("{}/{}", JOIN_LINK_BASE, self.code)
    }

    /// Invite text for the share sheet
    pub fn share_message(&self) -> String {
        format!(
            "🎉 Join my party on Festify Pro!\nParty: {}\nCode: {}\nClick here to join: {}",
            self.title,
            self.code,
            self.join_link()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{SongLanguage, Track};

    fn code() -> PartyCode {
        PartyCode::parse("BEACH1").unwrap()
    }

    fn song(id: &str, added_at: i64) -> Song {
        let track = Track {
            id: id.to_string(),
            title: id.to_uppercase(),
            artist: "Band".to_string(),
            album_art: String::new(),
            duration: 120,
            language: SongLanguage::Hindi,
            audio_url: None,
        };
        Song::queued(track, "Ana", added_at)
    }

    #[test]
    fn test_new_party_has_host_as_sole_member() {
        let host = Member::new_host("Ana");
        let party = Party::new(code(), "Beach Bash".into(), host.clone());

        assert_eq!(party.member_count(), 1);
        assert_eq!(party.host(), Some(&host));
        assert_eq!(party.host_name, "Ana");
        assert!(party.queue.is_empty());
        assert!(party.current_song.is_none());
        assert!(!party.is_playing);
    }

    #[test]
    fn test_demo_party_has_guest_only() {
        let guest = Member::new_guest("Ben");
        let party = Party::demo(code(), "Party Night".into(), "DJ Master".into(), guest.clone());

        assert_eq!(party.host_id, DEMO_HOST_ID);
        assert_eq!(party.members, vec![guest]);
        assert!(party.host().is_none());
    }

    #[test]
    fn test_member_roster() {
        let host = Member::new_host("Ana");
        let guest = Member::new_guest("Ben");
        let mut party = Party::new(code(), "Beach Bash".into(), host);

        assert!(party.add_member(guest.clone()));
        assert!(!party.add_member(guest.clone()));
        assert_eq!(party.member_count(), 2);

        assert_eq!(party.remove_member(&guest.id), Some(guest));
        assert_eq!(party.remove_member("missing"), None);
        assert_eq!(party.member_count(), 1);
    }

    #[test]
    fn test_advance_pops_head_and_goes_idle() {
        let mut party = Party::new(code(), "Beach Bash".into(), Member::new_host("Ana"));
        party.enqueue(song("s1", 1));
        party.enqueue(song("s2", 2));
        party.current_time = 42.0;

        assert_eq!(party.advance().map(|s| s.id.clone()), Some("s1".to_string()));
        assert_eq!(party.current_time, 0.0);
        assert!(party.is_playing);
        assert_eq!(party.queue.len(), 1);

        party.advance();
        assert_eq!(party.current_song.as_ref().map(|s| s.id.as_str()), Some("s2"));

        assert!(party.advance().is_none());
        assert!(party.current_song.is_none());
        assert!(!party.is_playing);
    }

    #[test]
    fn test_same_millisecond_songs_return_to_insertion_order() {
        let mut party = Party::new(code(), "Beach Bash".into(), Member::new_host("Ana"));
        party.enqueue(song("a", 5));
        party.enqueue(song("c", 5));
        assert_eq!(party.queue[0].seq, 0);
        assert_eq!(party.queue[1].seq, 1);

        party.vote("c", VoteDirection::Up);
        party.vote("c", VoteDirection::Down);

        let ids: Vec<&str> = party.queue.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_share_message_contains_code() {
        let party = Party::new(code(), "Beach Bash".into(), Member::new_host("Ana"));
        let message = party.share_message();
        assert!(message.contains("Party: Beach Bash"));
        assert!(message.contains("Code: BEACH1"));
        assert!(message.contains("https://festifypro.app/join/BEACH1"));
    }
}
