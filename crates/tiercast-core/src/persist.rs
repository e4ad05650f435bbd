//! Durable history storage — startup load and coalescing background flush.
//!
//! The persisted state is a single JSON artifact holding the ordered record
//! sequence exactly as buffered (oldest first). At startup it is re-read in
//! full and truncated to the newest `capacity` entries; malformed or
//! unreadable state is logged and treated as "no prior state" rather than
//! failing the process.
//!
//! # Flush discipline
//!
//! Flushing never runs on the request path. A single background worker owns
//! the sink; flush requests arrive over a capacity-1 channel, so at most one
//! flush is in flight with at most one more pending. A request arriving
//! while the slot is full coalesces into the pending flush instead of
//! queueing unboundedly. Once started, a flush runs to completion or
//! failure; there is no cancellation.
//!
//! Writes go to a temp file in the artifact's directory and are renamed
//! into place, so a crash mid-write leaves the previous artifact intact.
//! Flush failures are logged and swallowed — the in-memory buffer remains
//! the source of truth for the life of the process.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::PersistError;
use crate::history::PredictionHistory;
use crate::record::PredictionRecord;

// =============================================================================
// HistoryStore
// =============================================================================

/// Reads and writes the durable history artifact.
///
/// All methods are synchronous and blocking; callers on an async runtime
/// wrap them in `spawn_blocking` (the flush worker does).
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Create a store for the given artifact path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The artifact path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load persisted records, keeping only the newest `capacity` entries.
    ///
    /// A missing, unreadable, or malformed artifact yields an empty vector:
    /// bad prior state must never fail startup.
    #[must_use]
    pub fn load(&self, capacity: usize) -> Vec<PredictionRecord> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no prior history artifact");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read history artifact; starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<PredictionRecord>>(&raw) {
            Ok(mut records) => {
                if records.len() > capacity {
                    // Oldest-first truncation.
                    records.drain(..records.len() - capacity);
                }
                debug!(
                    path = %self.path.display(),
                    count = records.len(),
                    "loaded prior history"
                );
                records
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "malformed history artifact; starting empty");
                Vec::new()
            }
        }
    }

    /// Serialize the records and atomically replace the artifact.
    pub fn write(&self, records: &[PredictionRecord]) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| PersistError::Serialize(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    PersistError::Write(parent.display().to_string(), e.to_string())
                })?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .map_err(|e| PersistError::Write(tmp_path.display().to_string(), e.to_string()))?;
        std::fs::rename(&tmp_path, &self.path)
            .map_err(|e| PersistError::Write(self.path.display().to_string(), e.to_string()))?;
        Ok(())
    }
}

// =============================================================================
// Flush worker
// =============================================================================

/// Flush activity counters, readable from any thread.
#[derive(Debug, Default)]
pub struct FlushCounters {
    completed: AtomicU64,
    failed: AtomicU64,
    coalesced: AtomicU64,
}

impl FlushCounters {
    /// Flushes that wrote the artifact successfully.
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Flushes that failed (logged and swallowed).
    #[must_use]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Requests that folded into an already-pending flush.
    #[must_use]
    pub fn coalesced(&self) -> u64 {
        self.coalesced.load(Ordering::Relaxed)
    }

    /// Serializable snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> FlushStats {
        FlushStats {
            completed: self.completed(),
            failed: self.failed(),
            coalesced: self.coalesced(),
        }
    }
}

/// Serializable flush counters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FlushStats {
    /// Successful flushes.
    pub completed: u64,
    /// Failed flushes.
    pub failed: u64,
    /// Coalesced flush requests.
    pub coalesced: u64,
}

/// Handle to the background flush worker.
///
/// Dropping the handle without calling [`shutdown`](FlushHandle::shutdown)
/// detaches the worker; it keeps serving queued requests until its channel
/// closes.
pub struct FlushHandle {
    trigger_tx: mpsc::Sender<()>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    counters: Arc<FlushCounters>,
}

impl FlushHandle {
    /// Request an asynchronous flush.
    ///
    /// Never blocks. Returns `false` when the request coalesced into a flush
    /// that is already pending.
    pub fn request_flush(&self) -> bool {
        match self.trigger_tx.try_send(()) {
            Ok(()) => true,
            Err(_) => {
                self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Shared flush counters.
    #[must_use]
    pub fn counters(&self) -> &Arc<FlushCounters> {
        &self.counters
    }

    /// Stop the worker after a final best-effort flush.
    pub async fn shutdown(self) {
        // The worker drains any pending trigger, runs the final flush, and
        // exits. An already-finished worker makes the send a no-op.
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "flush worker did not shut down cleanly");
        }
    }
}

/// Spawn the single background flush worker for a history/store pair.
///
/// Must be called from within a tokio runtime.
#[must_use]
pub fn spawn_flush_worker(
    store: Arc<HistoryStore>,
    history: Arc<PredictionHistory>,
) -> FlushHandle {
    // Capacity 1: one in-flight flush plus at most one pending request.
    let (trigger_tx, trigger_rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let counters = Arc::new(FlushCounters::default());

    let worker_counters = Arc::clone(&counters);
    let task = tokio::spawn(flush_loop(
        store,
        history,
        trigger_rx,
        shutdown_rx,
        worker_counters,
    ));

    FlushHandle {
        trigger_tx,
        shutdown_tx,
        task,
        counters,
    }
}

async fn flush_loop(
    store: Arc<HistoryStore>,
    history: Arc<PredictionHistory>,
    mut trigger_rx: mpsc::Receiver<()>,
    mut shutdown_rx: watch::Receiver<bool>,
    counters: Arc<FlushCounters>,
) {
    loop {
        tokio::select! {
            // Drain pending triggers before honoring shutdown, so a flush
            // requested just before shutdown still runs as its own flush.
            biased;
            received = trigger_rx.recv() => {
                if received.is_none() {
                    return;
                }
                flush_once(&store, &history, &counters).await;
            }
            _ = shutdown_rx.changed() => {
                // Final best-effort flush of whatever the buffer holds now.
                flush_once(&store, &history, &counters).await;
                debug!("flush worker stopped");
                return;
            }
        }
    }
}

async fn flush_once(
    store: &Arc<HistoryStore>,
    history: &Arc<PredictionHistory>,
    counters: &Arc<FlushCounters>,
) {
    let snapshot = history.snapshot();
    let count = snapshot.len();
    let store = Arc::clone(store);

    let result = tokio::task::spawn_blocking(move || store.write(&snapshot)).await;
    match result {
        Ok(Ok(())) => {
            counters.completed.fetch_add(1, Ordering::Relaxed);
            debug!(count, "history flushed");
        }
        Ok(Err(e)) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            warn!(error = %e, "history flush failed");
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            warn!(error = %e, "history flush task panicked");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
