//! Background polling loop that re-fingerprints the spec directory and
//! triggers an uncached refresh on change.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::CatalogEngine;
use crate::model::SpecFingerprint;
use crate::spec_loader;

/// Spawn the watch loop as a background task if `config.watch_enabled` is
/// set; otherwise this is a no-op and returns `None`. The task polls every
/// `watch_interval_secs` seconds, compares fingerprints by relative path,
/// size, and mtime, and calls `engine.refresh(false)` on any change.
pub fn spawn(engine: Arc<CatalogEngine>) -> Option<tokio::task::JoinHandle<()>> {
    let config = engine.config().clone();
    if !config.watch_enabled {
        return None;
    }

    let interval = Duration::from_secs(config.watch_interval_secs.max(1));
    let spec_dir = config.spec_dir.clone();
    let mut last = spec_loader::fingerprint_spec_files(Path::new(&spec_dir)).unwrap_or_default();

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick fires immediately; skip it
        loop {
            ticker.tick().await;
            let current = match spec_loader::fingerprint_spec_files(Path::new(&spec_dir)) {
                Ok(fingerprints) => fingerprints,
                Err(err) => {
                    tracing::warn!(error = %err, "watcher failed to fingerprint spec directory");
                    continue;
                }
            };
            if fingerprints_changed(&last, &current) {
                tracing::info!(spec_dir = %spec_dir, "spec directory changed, triggering refresh");
                if let Err(err) = engine.refresh(false).await {
                    tracing::warn!(error = %err, "watcher-triggered refresh failed");
                    continue;
                }
                last = current;
            }
        }
    }))
}

fn fingerprints_changed(prev: &[SpecFingerprint], current: &[SpecFingerprint]) -> bool {
    if prev.len() != current.len() {
        return true;
    }
    let mut prev_sorted: Vec<&SpecFingerprint> = prev.iter().collect();
    let mut curr_sorted: Vec<&SpecFingerprint> = current.iter().collect();
    prev_sorted.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    curr_sorted.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    prev_sorted.iter().zip(curr_sorted.iter()).any(|(a, b)| {
        a.relative_path != b.relative_path || a.size != b.size || a.mtime != b.mtime
    })
}
