//! Durable snapshot for the in-memory store: a JSON file of every entry,
//! loaded at startup and flushed in the background whenever the store has
//! changed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::foodlog::model::FoodLogEntry;
use crate::foodlog::store::FoodLogStore;

/// Loads the snapshot file into the store if it exists. Totals come from
/// recomputation during import, not from the file.
pub async fn load(store: &FoodLogStore, path: &Path) -> anyhow::Result<()> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no snapshot file, starting empty");
            return Ok(());
        }
        Err(e) => return Err(e).context("read snapshot"),
    };
    let entries: Vec<FoodLogEntry> =
        serde_json::from_slice(&bytes).context("parse snapshot")?;
    let count = entries.len();
    store.import_entries(entries).await;
    info!(path = %path.display(), entries = count, "loaded snapshot");
    Ok(())
}

/// Writes the full store to the snapshot path, via a temp file and rename so
/// a crash mid-write never leaves a torn snapshot.
pub async fn flush(store: &FoodLogStore, path: &Path) -> anyhow::Result<()> {
    let entries = store.export_entries().await;
    let json = serde_json::to_vec_pretty(&entries).context("serialize snapshot")?;

    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, &json).await.context("write snapshot")?;
    tokio::fs::rename(&tmp, path).await.context("rename snapshot")?;
    debug!(path = %path.display(), entries = entries.len(), "flushed snapshot");
    Ok(())
}

/// Background task: every `interval_secs`, flush if the store reports dirty.
/// A failed flush re-marks the store so the next tick retries.
pub fn spawn_flusher(store: Arc<FoodLogStore>, path: PathBuf, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if !store.take_dirty().await {
                continue;
            }
            if let Err(e) = flush(&store, &path).await {
                warn!(error = %e, path = %path.display(), "snapshot flush failed");
                store.mark_dirty().await;
            }
        }
    });
}
