//! Sound ownership and status forwarding for the party store

use std::sync::Weak;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::PartyStore;
use crate::domain::value_objects::PlaybackStatus;
use crate::infrastructure::audio::{SoundHandle, StatusStream};

/// Status report tagged with the playback generation it belongs to
pub(super) type TaggedStatus = (u64, PlaybackStatus);

/// The one sound the store holds, plus the task forwarding its reports
pub(super) struct LoadedSound {
    pub handle: SoundHandle,
    pub generation: u64,
    pub forwarder: JoinHandle<()>,
}

/// Forward a sound's reports to the store's status loop
pub(super) fn spawn_forwarder(
    generation: u64,
    mut statuses: StatusStream,
    tx: mpsc::UnboundedSender<TaggedStatus>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(status) = statuses.next().await {
            trace!("Status for generation {}: {:?}", generation, status);
            if tx.send((generation, status)).is_err() || status.did_just_finish {
                break;
            }
        }
    })
}

/// Apply forwarded reports one at a time until the store goes away
pub(super) async fn run_status_loop(
    store: Weak<PartyStore>,
    mut rx: mpsc::UnboundedReceiver<TaggedStatus>,
) {
    while let Some((generation, status)) = rx.recv().await {
        let Some(store) = store.upgrade() else {
            break;
        };
        store.handle_status(generation, status).await;
    }
    debug!("Status loop stopped");
}
