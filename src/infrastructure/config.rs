//! Store configuration
//!
//! Built-in defaults, overridable from the environment.

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::application::party::{DemoPartyTemplate, JoinMode};

pub const DEFAULT_FALLBACK_AUDIO_URL: &str =
    "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3";

/// Party store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Stream used for songs that carry no audio URL
    pub fallback_audio_url: String,
    pub join_mode: JoinMode,
    pub demo_party_title: String,
    pub demo_host_name: String,
    /// Snapshots buffered per subscriber before the oldest is dropped
    pub event_capacity: usize,
    /// Seed for party code generation; entropy when unset
    pub code_seed: Option<u64>,
    /// Track length reported by the simulated audio driver
    pub simulated_track_secs: u64,
    pub simulated_tick_ms: u64,
    /// JSON track list to use instead of the built-in sample catalog
    pub catalog_path: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            fallback_audio_url: DEFAULT_FALLBACK_AUDIO_URL.to_string(),
            join_mode: JoinMode::Directory,
            demo_party_title: "Party Night".to_string(),
            demo_host_name: "DJ Master".to_string(),
            event_capacity: 64,
            code_seed: None,
            simulated_track_secs: 30,
            simulated_tick_ms: 500,
            catalog_path: None,
        }
    }
}

impl StoreConfig {
    /// Defaults overridden by `FESTIFY_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let join_mode = match lookup("FESTIFY_JOIN_MODE") {
            Some(raw) => JoinMode::from_str(&raw).unwrap_or_else(|| {
                warn!("Ignoring FESTIFY_JOIN_MODE={:?}, expected directory|demo", raw);
                defaults.join_mode
            }),
            None => defaults.join_mode,
        };

        Self {
            fallback_audio_url: lookup("FESTIFY_FALLBACK_AUDIO_URL")
                .unwrap_or(defaults.fallback_audio_url),
            join_mode,
            demo_party_title: lookup("FESTIFY_DEMO_PARTY_TITLE")
                .unwrap_or(defaults.demo_party_title),
            demo_host_name: lookup("FESTIFY_DEMO_HOST_NAME").unwrap_or(defaults.demo_host_name),
            event_capacity: parse_var(&lookup, "FESTIFY_EVENT_CAPACITY")
                .filter(|capacity| *capacity > 0)
                .unwrap_or(defaults.event_capacity),
            code_seed: parse_var(&lookup, "FESTIFY_CODE_SEED").or(defaults.code_seed),
            simulated_track_secs: parse_var(&lookup, "FESTIFY_SIM_TRACK_SECS")
                .unwrap_or(defaults.simulated_track_secs),
            simulated_tick_ms: parse_var(&lookup, "FESTIFY_SIM_TICK_MS")
                .filter(|tick| *tick > 0)
                .unwrap_or(defaults.simulated_tick_ms),
            catalog_path: lookup("FESTIFY_CATALOG_PATH").or(defaults.catalog_path),
        }
    }

    pub fn demo_template(&self) -> DemoPartyTemplate {
        DemoPartyTemplate {
            title: self.demo_party_title.clone(),
            host_name: self.demo_host_name.clone(),
        }
    }

    pub fn simulated_track_length(&self) -> Duration {
        Duration::from_secs(self.simulated_track_secs)
    }

    pub fn simulated_tick(&self) -> Duration {
        Duration::from_millis(self.simulated_tick_ms)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}, not a valid number", key, raw);
            None
        }
    }
}
