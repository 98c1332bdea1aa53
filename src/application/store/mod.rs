//! Party Store
//!
//! Single source of truth for the active party, the local user and playback.
//! Every mutation republishes a complete `PartySnapshot`.
//!
//! The `PartyDirectory` only tracks roster state (parties by code and their
//! members). Queue, votes and playback live in this store and are never
//! written back, so a guest joining from another store sees the party as it
//! was published at creation.
//!
//! Playback transitions (advance, play/pause, teardown) serialize on one
//! async mutex that also owns the loaded sound, so overlapping requests
//! queue instead of interleaving around driver calls. Each loaded sound gets
//! a generation number; reports from an older generation are dropped.

mod playback;
mod snapshot;

pub use snapshot::PartySnapshot;

use std::sync::Arc;

use async_broadcast::{broadcast, Receiver, Sender};
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::application::party::{
    CreateParty, CreatePartyError, CreatePartyInput, JoinParty, JoinPartyError, JoinPartyInput,
    LeaveParty, LeavePartyInput,
};
use crate::domain::entities::{Member, Party, Song, Track};
use crate::domain::repositories::PartyDirectory;
use crate::domain::services::VoteDirection;
use crate::domain::value_objects::{PartyCode, PlaybackStatus};
use crate::infrastructure::audio::{AudioDriver, AudioError};
use crate::infrastructure::config::StoreConfig;
use playback::{run_status_loop, spawn_forwarder, LoadedSound, TaggedStatus};

#[derive(Default)]
struct SessionState {
    party: Option<Party>,
    user: Option<Member>,
    is_playing: bool,
    current_time: f64,
    /// Bumped whenever the current song changes or playback is torn down
    generation: u64,
    revision: u64,
}

impl SessionState {
    fn snapshot(&self) -> PartySnapshot {
        PartySnapshot {
            party: self.party.clone(),
            user: self.user.clone(),
            is_host: self.user.as_ref().map_or(false, |u| u.is_host),
            is_playing: self.is_playing,
            current_time: self.current_time,
            revision: self.revision,
        }
    }

    fn is_active(&self) -> bool {
        self.is_playing
            || self.current_time != 0.0
            || self
                .party
                .as_ref()
                .map_or(false, |p| p.current_song.is_some())
    }
}

/// Party state container
pub struct PartyStore {
    config: StoreConfig,
    audio: Arc<dyn AudioDriver>,
    session: RwLock<SessionState>,
    playback: Mutex<Option<LoadedSound>>,
    status_tx: mpsc::UnboundedSender<TaggedStatus>,
    create_party: CreateParty<dyn PartyDirectory>,
    join_party: JoinParty<dyn PartyDirectory>,
    leave_party: LeaveParty<dyn PartyDirectory>,
    event_sender: Sender<PartySnapshot>,
    /// Keeps the channel open while nobody is subscribed
    _event_receiver: Receiver<PartySnapshot>,
}

impl PartyStore {
    /// Build a store. Must be called from within a tokio runtime: the
    /// status loop is spawned here and lives as long as the store.
    pub fn new(
        config: StoreConfig,
        directory: Arc<dyn PartyDirectory>,
        audio: Arc<dyn AudioDriver>,
    ) -> Arc<Self> {
        let (mut event_sender, event_receiver) = broadcast(config.event_capacity.max(1));
        event_sender.set_overflow(true);

        let (status_tx, status_rx) = mpsc::unbounded_channel();

        let create_party = CreateParty::new(directory.clone(), config.code_seed);
        let join_party = JoinParty::new(directory.clone(), config.join_mode, config.demo_template());
        let leave_party = LeaveParty::new(directory);

        let store = Arc::new(Self {
            config,
            audio,
            session: RwLock::new(SessionState::default()),
            playback: Mutex::new(None),
            status_tx,
            create_party,
            join_party,
            leave_party,
            event_sender,
            _event_receiver: event_receiver,
        });

        tokio::spawn(run_status_loop(Arc::downgrade(&store), status_rx));
        store
    }

    // ========== Snapshot ==========

    pub async fn snapshot(&self) -> PartySnapshot {
        self.session.read().await.snapshot()
    }

    /// Receive a snapshot after every change
    pub fn subscribe(&self) -> Receiver<PartySnapshot> {
        self.event_sender.new_receiver()
    }

    pub async fn is_host(&self) -> bool {
        self.session
            .read()
            .await
            .user
            .as_ref()
            .map_or(false, |u| u.is_host)
    }

    pub async fn is_playing(&self) -> bool {
        self.session.read().await.is_playing
    }

    pub async fn current_time(&self) -> f64 {
        self.session.read().await.current_time
    }

    fn publish(&self, session: &mut SessionState) {
        session.revision += 1;
        let revision = session.revision;
        match self.event_sender.try_broadcast(session.snapshot()) {
            Ok(None) => debug!("Published snapshot r{}", revision),
            Ok(Some(_)) => debug!("Published snapshot r{}, oldest buffered dropped", revision),
            Err(e) => warn!("Failed to publish snapshot r{}: {:?}", revision, e),
        }
    }

    // ========== Party lifecycle ==========

    /// Start a new party hosted by the local user and return its code.
    /// Replaces any party this store was in.
    pub async fn create_party(&self, input: CreatePartyInput) -> Result<PartyCode, CreatePartyError> {
        let output = self.create_party.execute(input).await?;
        let code = output.party.code.clone();

        self.end_playback().await;

        let previous = {
            let mut session = self.session.write().await;
            let previous = session.party.take().zip(session.user.take());
            session.party = Some(output.party);
            session.user = Some(output.host);
            session.is_playing = false;
            session.current_time = 0.0;
            session.generation += 1;
            self.publish(&mut session);
            previous
        };

        if let Some((party, member)) = previous {
            self.depart(party, member).await;
        }
        Ok(code)
    }

    /// Join the party with `code` as a guest.
    ///
    /// Joining the party this store already holds keeps its queue and playback.
    pub async fn join_party(&self, code: &str, user_name: &str) -> Result<Party, JoinPartyError> {
        let output = self
            .join_party
            .execute(JoinPartyInput {
                code: code.to_string(),
                user_name: user_name.to_string(),
            })
            .await?;

        let is_local = |session: &SessionState| {
            !output.fabricated
                && session
                    .party
                    .as_ref()
                    .map_or(false, |p| p.code == output.party.code)
        };

        if !is_local(&*self.session.read().await) {
            self.end_playback().await;
        }

        let (joined, previous) = {
            let mut session = self.session.write().await;
            let local = is_local(&*session);
            let previous_user = session.user.replace(output.member.clone());

            let result = if local {
                if let Some(party) = session.party.as_mut() {
                    party.add_member(output.member.clone());
                }
                let joined = session.party.clone().unwrap_or_else(|| output.party.clone());
                (joined, None)
            } else {
                let previous_party = session.party.replace(output.party.clone());
                session.is_playing = false;
                session.current_time = 0.0;
                session.generation += 1;
                (output.party.clone(), previous_party.zip(previous_user))
            };
            self.publish(&mut session);
            result
        };

        if let Some((party, member)) = previous {
            self.depart(party, member).await;
        }
        Ok(joined)
    }

    /// Leave the current party, stopping playback. No-op without a party.
    pub async fn leave_party(&self) {
        let previous = {
            let mut session = self.session.write().await;
            if session.party.is_none() && session.user.is_none() {
                debug!("No active party to leave");
                return;
            }
            let previous = session.party.take().zip(session.user.take());
            session.is_playing = false;
            session.current_time = 0.0;
            session.generation += 1;
            self.publish(&mut session);
            previous
        };

        self.end_playback().await;

        if let Some((party, member)) = previous {
            self.depart(party, member).await;
        }
        info!("Left party");
    }

    async fn depart(&self, party: Party, member: Member) {
        let code = party.code.clone();
        match self
            .leave_party
            .execute(LeavePartyInput { party, member })
            .await
        {
            Ok(output) => debug!("Departed {} (party closed: {})", code, output.party_deleted),
            Err(e) => warn!("Failed to leave party {} in directory: {}", code, e),
        }
    }

    // ========== Queue ==========

    /// Append a track to the queue tail with zero votes
    pub async fn add_song_to_queue(&self, track: Track, user_name: &str) {
        let mut session = self.session.write().await;
        let Some(party) = session.party.as_mut() else {
            debug!("No active party, ignoring song {}", track.title);
            return;
        };

        let title = track.title.clone();
        let added_at = chrono::Utc::now().timestamp_millis();
        party.enqueue(Song::queued(track, user_name, added_at));
        info!("Added song to queue: {}", title);
        self.publish(&mut session);
    }

    /// Vote a queued song up or down and re-rank the queue
    pub async fn vote_song(&self, song_id: &str, increment: bool) {
        let mut session = self.session.write().await;
        let Some(party) = session.party.as_mut() else {
            debug!("No active party, ignoring vote for {}", song_id);
            return;
        };

        match party.vote(song_id, VoteDirection::from(increment)) {
            Some(votes) => {
                debug!("Song {} now has {} votes", song_id, votes);
                self.publish(&mut session);
            }
            None => debug!("Vote for unknown song {} ignored", song_id),
        }
    }

    // ========== Playback ==========

    /// Move the queue head into the current song and start it.
    /// With an empty queue playback goes idle.
    pub async fn play_next_song(&self) {
        let mut slot = self.playback.lock().await;
        self.advance(&mut slot).await;
    }

    /// Discard the current song and play the next one
    pub async fn skip_song(&self) {
        info!("Skipped song");
        self.play_next_song().await;
    }

    /// Pause or resume the loaded sound. No-op when nothing is loaded.
    pub async fn toggle_play_pause(&self) {
        let slot = self.playback.lock().await;
        let Some(sound) = slot.as_ref() else {
            debug!("No sound loaded, ignoring play/pause");
            return;
        };

        let playing = self.session.read().await.is_playing;
        let result = if playing {
            self.audio.pause(&sound.handle).await
        } else {
            self.audio.play(&sound.handle).await
        };

        if let Err(e) = result {
            error!("Error toggling playback: {}", e);
            return;
        }

        let mut session = self.session.write().await;
        session.is_playing = !playing;
        if let Some(party) = session.party.as_mut() {
            party.is_playing = !playing;
        }
        self.publish(&mut session);
        info!("{}", if playing { "Paused" } else { "Playing" });
    }

    async fn advance(&self, slot: &mut Option<LoadedSound>) {
        let (next, generation) = {
            let mut session = self.session.write().await;
            let was_active = session.is_active();

            session.generation += 1;
            let generation = session.generation;
            let next = session
                .party
                .as_mut()
                .and_then(|party| party.advance().cloned());
            session.current_time = 0.0;
            session.is_playing = next.is_some();

            if next.is_some() || was_active {
                self.publish(&mut session);
            }
            (next, generation)
        };

        if let Some(previous) = slot.take() {
            self.release(previous).await;
        }

        let Some(song) = next else {
            debug!("Queue empty, playback idle");
            return;
        };

        let uri = song
            .audio_url
            .clone()
            .unwrap_or_else(|| self.config.fallback_audio_url.clone());
        info!("Playing next song: {}", song.title);

        match self.start(&uri, generation).await {
            Ok(sound) => {
                if self.session.read().await.generation == generation {
                    *slot = Some(sound);
                } else {
                    debug!("Playback moved on while loading {}", song.title);
                    self.release(sound).await;
                }
            }
            Err(e) => error!("Error playing song {}: {}", song.title, e),
        }
    }

    async fn start(&self, uri: &str, generation: u64) -> Result<LoadedSound, AudioError> {
        let handle = self.audio.load(uri).await?;

        let statuses = match self.audio.subscribe(&handle).await {
            Ok(statuses) => statuses,
            Err(e) => {
                if let Err(unload) = self.audio.unload(&handle).await {
                    warn!("Failed to unload {}: {}", handle, unload);
                }
                return Err(e);
            }
        };

        let sound = LoadedSound {
            forwarder: spawn_forwarder(generation, statuses, self.status_tx.clone()),
            handle,
            generation,
        };

        if let Err(e) = self.audio.play(&sound.handle).await {
            self.release(sound).await;
            return Err(e);
        }
        Ok(sound)
    }

    /// Stop and unload a sound. Driver errors are logged and swallowed.
    async fn release(&self, sound: LoadedSound) {
        sound.forwarder.abort();
        if let Err(e) = self.audio.stop(&sound.handle).await {
            warn!("Failed to stop {}: {}", sound.handle, e);
        }
        if let Err(e) = self.audio.unload(&sound.handle).await {
            warn!("Failed to unload {}: {}", sound.handle, e);
        }
        debug!("Released sound {} (generation {})", sound.handle, sound.generation);
    }

    /// Release the loaded sound and invalidate its pending reports
    async fn end_playback(&self) {
        let mut slot = self.playback.lock().await;
        self.session.write().await.generation += 1;
        if let Some(sound) = slot.take() {
            self.release(sound).await;
        }
    }

    async fn handle_status(&self, generation: u64, status: PlaybackStatus) {
        if !self.apply_status(generation, status).await {
            debug!("Dropped report from replaced generation {}", generation);
            return;
        }
        if status.did_just_finish {
            self.finish_song(generation).await;
        }
    }

    /// Record a position report. False when the report is stale.
    async fn apply_status(&self, generation: u64, status: PlaybackStatus) -> bool {
        let mut session = self.session.write().await;
        if session.generation != generation {
            return false;
        }

        let position = status.position_secs();
        if position > session.current_time {
            session.current_time = position;
            if let Some(party) = session.party.as_mut() {
                party.current_time = position;
            }
            self.publish(&mut session);
        }
        true
    }

    async fn finish_song(&self, generation: u64) {
        let mut slot = self.playback.lock().await;
        if self.session.read().await.generation != generation {
            debug!("Song already replaced, ignoring finish");
            return;
        }
        info!("Song finished");
        self.advance(&mut slot).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::party::JoinMode;
    use crate::domain::entities::SongLanguage;
    use crate::infrastructure::audio::ScriptedAudioDriver;
    use crate::infrastructure::directory::InMemoryPartyDirectory;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: id.to_uppercase(),
            artist: "Artist".to_string(),
            album_art: String::new(),
            duration: 200,
            language: SongLanguage::Hindi,
            audio_url: None,
        }
    }

    async fn playing_store() -> (Arc<PartyStore>, u64) {
        playing_store_with(StoreConfig::default()).await
    }

    async fn playing_store_with(config: StoreConfig) -> (Arc<PartyStore>, u64) {
        let store = PartyStore::new(
            config,
            Arc::new(InMemoryPartyDirectory::new()),
            Arc::new(ScriptedAudioDriver::new()),
        );
        store
            .create_party(CreatePartyInput::new("Test", "Host"))
            .await
            .unwrap();
        store.add_song_to_queue(track("a"), "Host").await;
        store.add_song_to_queue(track("b"), "Host").await;
        store.play_next_song().await;
        let generation = store.session.read().await.generation;
        (store, generation)
    }

    #[tokio::test]
    async fn test_stale_reports_are_dropped() {
        let (store, generation) = playing_store().await;
        store.skip_song().await;
        let revision = store.snapshot().await.revision;

        store
            .handle_status(generation, PlaybackStatus::at(42_000))
            .await;
        store
            .handle_status(generation, PlaybackStatus::finished(200_000))
            .await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.revision, revision);
        assert_eq!(snapshot.current_time, 0.0);
        assert_eq!(snapshot.current_song().map(|s| s.id.as_str()), Some("b"));
    }

    #[tokio::test]
    async fn test_switching_party_invalidates_old_reports() {
        let (store, generation) = playing_store().await;

        store
            .create_party(CreatePartyInput::new("Second", "Host"))
            .await
            .unwrap();
        let created = store.session.read().await.generation;
        assert!(created > generation);

        let revision = store.snapshot().await.revision;
        store
            .handle_status(generation, PlaybackStatus::at(42_000))
            .await;
        store
            .handle_status(created - 1, PlaybackStatus::finished(200_000))
            .await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.revision, revision);
        assert_eq!(snapshot.current_time, 0.0);
        assert!(snapshot.current_song().is_none());
        assert_eq!(snapshot.party.map(|p| p.title), Some("Second".to_string()));
    }

    #[tokio::test]
    async fn test_joining_other_party_invalidates_old_reports() {
        let config = StoreConfig {
            join_mode: JoinMode::Demo,
            ..StoreConfig::default()
        };
        let (store, generation) = playing_store_with(config).await;

        store.join_party("DEMO01", "Guest").await.unwrap();
        let joined = store.session.read().await.generation;
        assert!(joined > generation);

        let revision = store.snapshot().await.revision;
        store
            .handle_status(joined - 1, PlaybackStatus::finished(200_000))
            .await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.revision, revision);
        assert!(snapshot.current_song().is_none());
        assert_eq!(snapshot.party.map(|p| p.title), Some("Party Night".to_string()));
    }

    #[tokio::test]
    async fn test_current_report_finishes_song() {
        let (store, generation) = playing_store().await;

        store
            .handle_status(generation, PlaybackStatus::finished(200_000))
            .await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.current_song().map(|s| s.id.as_str()), Some("b"));
        assert_eq!(snapshot.current_time, 0.0);
        assert!(store.session.read().await.generation > generation);
        assert!(store.playback.lock().await.is_some());
    }
}
