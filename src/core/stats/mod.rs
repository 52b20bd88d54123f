use crate::core::error::QueueError;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Running operation counters for one queue.
#[derive(Debug, Default)]
pub(crate) struct QueueStats {
    inserted: AtomicU64,
    removed: AtomicU64,
    full_timeouts: AtomicU64,
    empty_timeouts: AtomicU64,
    lock_timeouts: AtomicU64,
    closed_rejections: AtomicU64,
}

impl QueueStats {
    pub(crate) fn record_insert(&self) {
        self.inserted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_remove(&self) {
        self.removed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self, kind: QueueError) {
        let counter = match kind {
            QueueError::LockAcquisitionFailed => &self.lock_timeouts,
            QueueError::Full => &self.full_timeouts,
            QueueError::Empty => &self.empty_timeouts,
            QueueError::Closed => &self.closed_rejections,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(
        &self,
        name: &str,
        capacity: usize,
        size: usize,
        closed: bool,
    ) -> StatsSnapshot {
        StatsSnapshot {
            name: name.to_string(),
            capacity,
            size,
            closed,
            inserted: self.inserted.load(Ordering::Relaxed),
            removed: self.removed.load(Ordering::Relaxed),
            full_timeouts: self.full_timeouts.load(Ordering::Relaxed),
            empty_timeouts: self.empty_timeouts.load(Ordering::Relaxed),
            lock_timeouts: self.lock_timeouts.load(Ordering::Relaxed),
            closed_rejections: self.closed_rejections.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a queue, suitable for NDJSON export.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub name: String,
    pub capacity: usize,
    pub size: usize,
    pub closed: bool,
    pub inserted: u64,
    pub removed: u64,
    pub full_timeouts: u64,
    pub empty_timeouts: u64,
    pub lock_timeouts: u64,
    pub closed_rejections: u64,
}

/// Append snapshots to `path`, one JSON object per line.
pub fn append_snapshots(
    snapshots: &[StatsSnapshot],
    path: impl AsRef<Path>,
) -> std::io::Result<()> {
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;

    for snapshot in snapshots {
        let json = serde_json::to_string(snapshot)?;
        writeln!(file, "{}", json)?;
    }
    Ok(())
}
