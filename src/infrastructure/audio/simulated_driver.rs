//! Simulated audio driver
//!
//! Plays nothing. Each loaded sound advances a virtual clock on a fixed tick
//! while playing and finishes after a configured track length.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::driver::{is_supported_uri, AudioDriver, AudioError, SoundHandle, StatusStream};
use crate::domain::value_objects::PlaybackStatus;

#[derive(Debug)]
struct SimulatedSound {
    uri: String,
    position_ms: u64,
    playing: bool,
    finished: bool,
}

/// Timer-driven stand-in for a real audio backend
pub struct SimulatedAudioDriver {
    sounds: Arc<RwLock<HashMap<SoundHandle, SimulatedSound>>>,
    track_length: Duration,
    tick: Duration,
}

impl SimulatedAudioDriver {
    pub fn new(track_length: Duration, tick: Duration) -> Self {
        info!(
            "SimulatedAudioDriver initialized: track {:?}, tick {:?}",
            track_length, tick
        );
        Self {
            sounds: Arc::new(RwLock::new(HashMap::new())),
            track_length,
            tick: tick.max(Duration::from_millis(1)),
        }
    }

    /// Number of sounds currently loaded
    pub async fn loaded_count(&self) -> usize {
        self.sounds.read().await.len()
    }

    async fn with_sound<F>(&self, handle: &SoundHandle, f: F) -> Result<(), AudioError>
    where
        F: FnOnce(&mut SimulatedSound),
    {
        let mut sounds = self.sounds.write().await;
        let sound = sounds
            .get_mut(handle)
            .ok_or_else(|| AudioError::UnknownHandle(handle.clone()))?;
        f(sound);
        Ok(())
    }
}

#[async_trait]
impl AudioDriver for SimulatedAudioDriver {
    async fn load(&self, uri: &str) -> Result<SoundHandle, AudioError> {
        if !is_supported_uri(uri) {
            return Err(AudioError::InvalidUri(uri.to_string()));
        }

        let handle = SoundHandle::new(Uuid::new_v4().to_string());
        let sound = SimulatedSound {
            uri: uri.to_string(),
            position_ms: 0,
            playing: false,
            finished: false,
        };
        self.sounds.write().await.insert(handle.clone(), sound);
        debug!("Loaded {} as {}", uri, handle);
        Ok(handle)
    }

    async fn play(&self, handle: &SoundHandle) -> Result<(), AudioError> {
        self.with_sound(handle, |sound| sound.playing = !sound.finished)
            .await
    }

    async fn pause(&self, handle: &SoundHandle) -> Result<(), AudioError> {
        self.with_sound(handle, |sound| sound.playing = false).await
    }

    async fn stop(&self, handle: &SoundHandle) -> Result<(), AudioError> {
        self.with_sound(handle, |sound| {
            sound.playing = false;
            sound.position_ms = 0;
        })
        .await
    }

    async fn unload(&self, handle: &SoundHandle) -> Result<(), AudioError> {
        let removed = self.sounds.write().await.remove(handle);
        match removed {
            Some(sound) => {
                debug!("Unloaded {} ({})", handle, sound.uri);
                Ok(())
            }
            None => Err(AudioError::UnknownHandle(handle.clone())),
        }
    }

    async fn subscribe(&self, handle: &SoundHandle) -> Result<StatusStream, AudioError> {
        if !self.sounds.read().await.contains_key(handle) {
            return Err(AudioError::UnknownHandle(handle.clone()));
        }

        let sounds = self.sounds.clone();
        let handle = handle.clone();
        let tick = self.tick;
        let tick_ms = tick.as_millis() as u64;
        let track_ms = self.track_length.as_millis() as u64;

        let stream = async_stream::stream! {
            let mut interval = tokio::time::interval(tick);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;

                let status = {
                    let mut sounds = sounds.write().await;
                    let Some(sound) = sounds.get_mut(&handle) else {
                        break;
                    };
                    if !sound.playing || sound.finished {
                        None
                    } else {
                        sound.position_ms = (sound.position_ms + tick_ms).min(track_ms);
                        if sound.position_ms >= track_ms {
                            sound.finished = true;
                            sound.playing = false;
                            Some(PlaybackStatus::finished(sound.position_ms))
                        } else {
                            Some(PlaybackStatus::at(sound.position_ms))
                        }
                    }
                };

                if let Some(status) = status {
                    yield status;
                    if status.did_just_finish {
                        break;
                    }
                }
            }
        };

        Ok(stream.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> SimulatedAudioDriver {
        SimulatedAudioDriver::new(Duration::from_secs(3), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_rejects_unsupported_uri() {
        let result = driver().load("not a uri").await;
        assert!(matches!(result, Err(AudioError::InvalidUri(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_progress_until_finished() {
        let driver = driver();
        let handle = driver.load("https://cdn.example/a.mp3").await.unwrap();
        let statuses = driver.subscribe(&handle).await.unwrap();
        driver.play(&handle).await.unwrap();

        let statuses: Vec<PlaybackStatus> = statuses.collect().await;
        assert_eq!(
            statuses,
            vec![
                PlaybackStatus::at(1000),
                PlaybackStatus::at(2000),
                PlaybackStatus::finished(3000),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_sound_does_not_advance() {
        let driver = driver();
        let handle = driver.load("https://cdn.example/a.mp3").await.unwrap();
        let mut statuses = driver.subscribe(&handle).await.unwrap();
        driver.play(&handle).await.unwrap();

        assert_eq!(statuses.next().await, Some(PlaybackStatus::at(1000)));
        driver.pause(&handle).await.unwrap();

        // Paused for a while, then resumed: position continues from 1s
        tokio::time::sleep(Duration::from_secs(5)).await;
        driver.play(&handle).await.unwrap();
        assert_eq!(statuses.next().await, Some(PlaybackStatus::at(2000)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unload_ends_stream() {
        let driver = driver();
        let handle = driver.load("file:///music/a.flac").await.unwrap();
        let statuses = driver.subscribe(&handle).await.unwrap();
        driver.unload(&handle).await.unwrap();

        let statuses: Vec<PlaybackStatus> = statuses.collect().await;
        assert!(statuses.is_empty());
        assert_eq!(driver.loaded_count().await, 0);
        assert!(matches!(
            driver.play(&handle).await,
            Err(AudioError::UnknownHandle(_))
        ));
    }
}
