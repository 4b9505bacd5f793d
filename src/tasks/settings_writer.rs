//! Settings persistence background task

use std::sync::Arc;
use tokio::{sync::mpsc, task};
use tracing::{debug, error, info, warn};

use crate::services::{Settings, SettingsStore};

/// Background task that writes queued settings to `store`.
///
/// Bursts of requests collapse into one write of the newest settings. Writes
/// run on the blocking pool. Returns once every sender has been dropped and
/// the queue is drained.
pub async fn settings_writer_task(
    store: Arc<dyn SettingsStore>,
    mut saves: mpsc::UnboundedReceiver<Settings>,
) {
    info!("Starting settings writer");

    while let Some(mut settings) = saves.recv().await {
        while let Ok(newer) = saves.try_recv() {
            settings = newer;
        }

        let store = Arc::clone(&store);
        match task::spawn_blocking(move || store.save(&settings)).await {
            Ok(Ok(())) => debug!("Settings saved"),
            Ok(Err(e)) => warn!("Failed to persist settings: {}", e),
            Err(e) => error!("Settings write panicked: {}", e),
        }
    }

    info!("Settings writer stopped");
}
