//! Bounded, concurrency-safe prediction history.
//!
//! An insertion-ordered buffer of the most recent predictions, capped at a
//! fixed capacity. At capacity, appending evicts the oldest record — the
//! buffer is an append-only ring with no delete or update operations.
//! Bounded memory is the invariant, not bounded throughput: `append` never
//! rejects.
//!
//! # Concurrency
//!
//! One mutex guards all mutation. It is held only for the insert/evict or
//! the snapshot copy, never across I/O, so request-path latency stays flat.
//! Readers always work from a [`snapshot`](PredictionHistory::snapshot):
//! a point-in-time copy that concurrent appends can never corrupt.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::record::PredictionRecord;

/// Hard upper bound on tail queries, regardless of the caller-supplied `n`.
pub const RECENT_LIMIT: usize = 1000;

// =============================================================================
// PredictionHistory
// =============================================================================

/// Fixed-capacity, thread-safe, insertion-ordered store of prediction records.
pub struct PredictionHistory {
    inner: Mutex<Inner>,
    capacity: usize,
}

struct Inner {
    records: VecDeque<PredictionRecord>,
    total_appended: u64,
    total_evicted: u64,
}

impl PredictionHistory {
    /// Create an empty history with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        Self {
            inner: Mutex::new(Inner {
                records: VecDeque::with_capacity(capacity),
                total_appended: 0,
                total_evicted: 0,
            }),
            capacity,
        }
    }

    /// Append a record to the tail.
    ///
    /// At capacity, the oldest (head) record is evicted first and returned.
    /// Always succeeds.
    pub fn append(&self, record: PredictionRecord) -> Option<PredictionRecord> {
        let mut inner = self.lock();
        let evicted = if inner.records.len() == self.capacity {
            inner.total_evicted += 1;
            inner.records.pop_front()
        } else {
            None
        };
        inner.records.push_back(record);
        inner.total_appended += 1;
        evicted
    }

    /// Point-in-time copy of the current contents, oldest to newest.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PredictionRecord> {
        let inner = self.lock();
        inner.records.iter().cloned().collect()
    }

    /// The last `min(n, len)` records, oldest to newest.
    ///
    /// `n` is clamped to [`RECENT_LIMIT`] to bound response size regardless
    /// of the caller-supplied value.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<PredictionRecord> {
        let n = n.min(RECENT_LIMIT);
        let inner = self.lock();
        let skip = inner.records.len().saturating_sub(n);
        inner.records.iter().skip(skip).cloned().collect()
    }

    /// Replace the contents with previously persisted records.
    ///
    /// Bootstrap-only: keeps the newest `capacity` entries (oldest-first
    /// truncation) and resets the append/evict counters. Not intended for
    /// use after concurrent appends have started.
    pub fn seed(&self, records: Vec<PredictionRecord>) {
        let mut inner = self.lock();
        let skip = records.len().saturating_sub(self.capacity);
        inner.records = records.into_iter().skip(skip).collect();
        inner.total_appended = inner.records.len() as u64;
        inner.total_evicted = 0;
    }

    /// Current number of buffered records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Whether the history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Maximum capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Serializable occupancy counters.
    #[must_use]
    pub fn stats(&self) -> HistoryStats {
        let inner = self.lock();
        HistoryStats {
            capacity: self.capacity,
            len: inner.records.len(),
            total_appended: inner.total_appended,
            total_evicted: inner.total_evicted,
            fill_ratio: inner.records.len() as f64 / self.capacity as f64,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned mutex means a panic mid-append; the buffer itself is
        // still structurally valid (VecDeque ops don't leave partial state).
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PredictionHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("PredictionHistory")
            .field("capacity", &self.capacity)
            .field("len", &inner.records.len())
            .field("total_appended", &inner.total_appended)
            .finish()
    }
}

// =============================================================================
// HistoryStats
// =============================================================================

/// Occupancy counters for the history buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Maximum capacity.
    pub capacity: usize,
    /// Current number of records.
    pub len: usize,
    /// Total records ever appended (including later-evicted ones).
    pub total_appended: u64,
    /// Total records evicted at capacity.
    pub total_evicted: u64,
    /// len / capacity.
    pub fill_ratio: f64,
}

// =============================================================================
// Tests
// =============================================================================
