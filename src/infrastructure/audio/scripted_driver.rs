//! Scripted audio driver for tests
//!
//! Records every call and lets the test push position reports by hand.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::driver::{AudioDriver, AudioError, SoundHandle, StatusStream};
use crate::domain::value_objects::PlaybackStatus;

/// A call made against the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCall {
    Load(String),
    Play(SoundHandle),
    Pause(SoundHandle),
    Stop(SoundHandle),
    Unload(SoundHandle),
    Subscribe(SoundHandle),
}

#[derive(Default)]
struct ScriptState {
    next_id: u64,
    calls: Vec<AudioCall>,
    loaded: HashMap<SoundHandle, String>,
    failing_uris: HashSet<String>,
    fail_transport: bool,
    listeners: HashMap<SoundHandle, mpsc::UnboundedSender<PlaybackStatus>>,
    last_subscribed: Option<SoundHandle>,
}

/// Audio driver whose status events are pushed by the caller
pub struct ScriptedAudioDriver {
    state: Mutex<ScriptState>,
    load_delay: Option<Duration>,
}

impl ScriptedAudioDriver {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ScriptState::default()),
            load_delay: None,
        }
    }

    /// Make every `load` take `delay` before completing
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }

    /// Make loads of `uri` fail
    pub async fn fail_uri(&self, uri: &str) {
        self.state.lock().await.failing_uris.insert(uri.to_string());
    }

    /// Make `play` and `pause` fail
    pub async fn set_fail_transport(&self, fail: bool) {
        self.state.lock().await.fail_transport = fail;
    }

    pub async fn calls(&self) -> Vec<AudioCall> {
        self.state.lock().await.calls.clone()
    }

    /// URIs of sounds currently loaded
    pub async fn loaded_uris(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut uris: Vec<String> = state.loaded.values().cloned().collect();
        uris.sort();
        uris
    }

    /// Handle of the most recently subscribed sound
    pub async fn current_handle(&self) -> Option<SoundHandle> {
        self.state.lock().await.last_subscribed.clone()
    }

    /// Push a status to the most recently subscribed sound.
    /// Returns false when nobody is listening.
    pub async fn emit(&self, status: PlaybackStatus) -> bool {
        let state = self.state.lock().await;
        let Some(handle) = state.last_subscribed.as_ref() else {
            return false;
        };
        state
            .listeners
            .get(handle)
            .map(|tx| tx.send(status).is_ok())
            .unwrap_or(false)
    }

    /// Push a status to a specific sound
    pub async fn emit_to(&self, handle: &SoundHandle, status: PlaybackStatus) -> bool {
        let state = self.state.lock().await;
        state
            .listeners
            .get(handle)
            .map(|tx| tx.send(status).is_ok())
            .unwrap_or(false)
    }

    async fn record(&self, call: AudioCall, handle: &SoundHandle) -> Result<(), AudioError> {
        let mut state = self.state.lock().await;
        state.calls.push(call);
        if !state.loaded.contains_key(handle) {
            return Err(AudioError::UnknownHandle(handle.clone()));
        }
        Ok(())
    }
}

impl Default for ScriptedAudioDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioDriver for ScriptedAudioDriver {
    async fn load(&self, uri: &str) -> Result<SoundHandle, AudioError> {
        self.state
            .lock()
            .await
            .calls
            .push(AudioCall::Load(uri.to_string()));

        if let Some(delay) = self.load_delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().await;
        if state.failing_uris.contains(uri) {
            return Err(AudioError::Load {
                uri: uri.to_string(),
                reason: "scripted failure".to_string(),
            });
        }

        state.next_id += 1;
        let handle = SoundHandle::new(format!("sound-{}", state.next_id));
        state.loaded.insert(handle.clone(), uri.to_string());
        Ok(handle)
    }

    async fn play(&self, handle: &SoundHandle) -> Result<(), AudioError> {
        self.record(AudioCall::Play(handle.clone()), handle).await?;
        if self.state.lock().await.fail_transport {
            return Err(AudioError::Playback("scripted play failure".to_string()));
        }
        Ok(())
    }

    async fn pause(&self, handle: &SoundHandle) -> Result<(), AudioError> {
        self.record(AudioCall::Pause(handle.clone()), handle).await?;
        if self.state.lock().await.fail_transport {
            return Err(AudioError::Playback("scripted pause failure".to_string()));
        }
        Ok(())
    }

    async fn stop(&self, handle: &SoundHandle) -> Result<(), AudioError> {
        self.record(AudioCall::Stop(handle.clone()), handle).await
    }

    async fn unload(&self, handle: &SoundHandle) -> Result<(), AudioError> {
        self.record(AudioCall::Unload(handle.clone()), handle).await?;
        let mut state = self.state.lock().await;
        state.loaded.remove(handle);
        // Dropping the sender ends the status stream
        state.listeners.remove(handle);
        Ok(())
    }

    async fn subscribe(&self, handle: &SoundHandle) -> Result<StatusStream, AudioError> {
        self.record(AudioCall::Subscribe(handle.clone()), handle).await?;
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock().await;
        state.listeners.insert(handle.clone(), tx);
        state.last_subscribed = Some(handle.clone());
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }
}
