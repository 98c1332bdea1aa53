use std::sync::Arc;

use anyhow::Context;

use crate::application::store::PartyStore;
use crate::infrastructure::audio::{AudioDriver, SimulatedAudioDriver};
use crate::infrastructure::catalog::SongCatalog;
use crate::infrastructure::config::StoreConfig;
use crate::infrastructure::directory::InMemoryPartyDirectory;

/// Everything one app session needs, wired together
#[derive(Clone)]
pub struct AppState {
    pub config: StoreConfig,

    /// Known parties, keyed by join code
    pub directory: Arc<InMemoryPartyDirectory>,

    /// Tracks guests can add to the queue
    pub catalog: Arc<SongCatalog>,

    /// The party state container
    pub store: Arc<PartyStore>,
}

impl AppState {
    /// Build from environment configuration with the simulated audio driver
    pub async fn new() -> anyhow::Result<Self> {
        let config = StoreConfig::from_env();
        let driver = Arc::new(SimulatedAudioDriver::new(
            config.simulated_track_length(),
            config.simulated_tick(),
        ));
        Self::with_driver(config, driver).await
    }

    pub async fn with_driver(
        config: StoreConfig,
        driver: Arc<dyn AudioDriver>,
    ) -> anyhow::Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => {
                tracing::info!("Loading song catalog from {}", path);
                let json = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read catalog {}", path))?;
                SongCatalog::from_json(&json)
                    .with_context(|| format!("Invalid catalog {}", path))?
            }
            None => SongCatalog::sample(),
        };
        tracing::info!("Song catalog has {} tracks", catalog.all().len());
        tracing::info!("Join mode: {}", config.join_mode.as_str());

        let directory = Arc::new(InMemoryPartyDirectory::new());
        let store = PartyStore::new(config.clone(), directory.clone(), driver);

        Ok(Self {
            config,
            directory,
            catalog: Arc::new(catalog),
            store,
        })
    }
}
