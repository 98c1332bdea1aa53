use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use festify_party::application::party::CreatePartyInput;
use festify_party::domain::entities::format_playback_time;
use festify_party::infrastructure::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "festify_party=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState::new().await?;
    let store = state.store.clone();

    // Mirror what a now-playing screen would render
    let mut snapshots = store.subscribe();
    let renderer = tokio::spawn(async move {
        let mut last_song = None;
        while let Ok(snapshot) = snapshots.recv().await {
            let song = snapshot.current_song().map(|s| s.title.clone());
            if song != last_song {
                match &song {
                    Some(title) => tracing::info!(
                        "Now playing: {} ({} queued)",
                        title,
                        snapshot.queue().len()
                    ),
                    None => tracing::info!("Nothing playing"),
                }
                last_song = song;
            }
        }
    });

    let code = store
        .create_party(
            CreatePartyInput::new("Beach Bash", "Ana").with_schedule(
                Some("Goa".into()),
                None,
                None,
            ),
        )
        .await?;
    tracing::info!("Share this code with guests: {}", code);

    let party = store.join_party(code.as_str(), "Ben").await?;
    tracing::info!("{} members in {}", party.member_count(), party.title);

    for track in state.catalog.all().iter().take(4) {
        store.add_song_to_queue(track.clone(), "Ben").await;
    }
    for track in state.catalog.search("naatu") {
        store.vote_song(&track.id, true).await;
        store.vote_song(&track.id, true).await;
    }

    store.play_next_song().await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    store.toggle_play_pause().await;
    tokio::time::sleep(Duration::from_millis(600)).await;
    store.toggle_play_pause().await;

    let snapshot = store.snapshot().await;
    tracing::info!(
        "At {} ({:.0}%) state={}",
        format_playback_time(snapshot.current_time),
        snapshot.progress() * 100.0,
        snapshot.playback_state().as_str()
    );

    store.skip_song().await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    store.leave_party().await;
    tracing::info!(
        "Directory now holds {} parties",
        state.directory.count().await
    );

    drop(store);
    drop(state);
    renderer.abort();
    Ok(())
}
