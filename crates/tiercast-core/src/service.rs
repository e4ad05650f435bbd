//! PredictionService orchestrator — the engine's public entry points.
//!
//! Ties the bounded history, the durable store, and the tier policy into
//! one explicitly constructed, explicitly owned component with a documented
//! lifecycle:
//!
//! ```text
//! PredictionService::bootstrap(config)
//!   ├── HistoryStore::load()        → seed PredictionHistory
//!   └── spawn_flush_worker()        → single background flush task
//! record_prediction(...)            → policy → append → counting flush check
//! distribution() / recalibration()  → reports from a snapshot
//! recent(n)                         → tail query
//! shutdown()                        → final flush, worker stops
//! ```
//!
//! The transport layer (HTTP or otherwise) lives outside this crate and
//! calls these entry points with already-typed, already-validated inputs.
//! Nothing here blocks on I/O: persistence is fire-and-forget through the
//! flush worker.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::analytics::{self, DistributionReport, RecalibrationReport};
use crate::config::TiercastConfig;
use crate::error::Result;
use crate::history::{HistoryStats, PredictionHistory};
use crate::persist::{FlushHandle, FlushStats, HistoryStore, spawn_flush_worker};
use crate::policy::{ThresholdMode, TierDecision, TierPolicy};
use crate::record::PredictionRecord;

// =============================================================================
// Types
// =============================================================================

/// Outcome of recording one prediction.
#[derive(Debug, Clone, Serialize)]
pub struct Recorded {
    /// The stored record (timestamped, probability rounded, tier assigned).
    pub record: PredictionRecord,
    /// The tier decision, including which thresholds were applied.
    pub decision: TierDecision,
    /// Whether this append evicted the oldest buffered record.
    pub evicted: bool,
}

/// Operational snapshot of the service, for health/status surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    /// Buffer occupancy counters.
    pub history: HistoryStats,
    /// Flush activity counters.
    pub flush: FlushStats,
    /// Configured threshold mode.
    pub mode: ThresholdMode,
    /// Artifact location.
    pub artifact_path: PathBuf,
}

// =============================================================================
// PredictionService
// =============================================================================

/// The prediction telemetry and adaptive-tiering engine.
///
/// One instance per process in production; tests construct fresh instances
/// against temp directories. All entry points take `&self` and are safe to
/// call from concurrent tasks.
pub struct PredictionService {
    history: Arc<PredictionHistory>,
    store: Arc<HistoryStore>,
    flush: FlushHandle,
    policy: TierPolicy,
    flush_every: u64,
    appends: AtomicU64,
}

impl PredictionService {
    /// Construct the service: load prior state, seed the buffer, and spawn
    /// the flush worker.
    ///
    /// Must be called from within a tokio runtime. Bad persisted state is
    /// not an error — the service starts with an empty buffer.
    pub fn bootstrap(config: &TiercastConfig, mode: ThresholdMode) -> Result<Self> {
        config.validate()?;

        let artifact_path = config.history.resolve_path();
        let store = Arc::new(HistoryStore::new(&artifact_path));
        let history = Arc::new(PredictionHistory::new(config.history.capacity));

        let prior = store.load(config.history.capacity);
        if !prior.is_empty() {
            history.seed(prior);
        }
        info!(
            path = %artifact_path.display(),
            restored = history.len(),
            capacity = config.history.capacity,
            "prediction service bootstrapped"
        );

        let flush = spawn_flush_worker(Arc::clone(&store), Arc::clone(&history));

        Ok(Self {
            history,
            store,
            flush,
            policy: TierPolicy::new(mode).with_floor(config.history.quantile_floor),
            flush_every: config.history.flush_every,
            appends: AtomicU64::new(0),
        })
    }

    /// Record one scored prediction.
    ///
    /// Assigns the tier (static or adaptive per the configured mode),
    /// appends the record, and every `flush_every`th successful append
    /// requests an asynchronous flush. Never blocks on persistence and
    /// never fails: flush problems are the worker's to log and swallow.
    pub fn record_prediction(
        &self,
        request_summary: Value,
        features_used: Value,
        probability: f64,
        employee_count: u64,
    ) -> Recorded {
        let snapshot = match self.policy.mode() {
            ThresholdMode::Static => Vec::new(),
            ThresholdMode::Adaptive => self.history.snapshot(),
        };
        let decision = self.policy.assign(probability, employee_count, &snapshot);

        let record = PredictionRecord::new(
            request_summary,
            features_used,
            probability,
            decision.tier,
            employee_count,
        );
        let evicted = self.history.append(record.clone()).is_some();

        let appended = self.appends.fetch_add(1, Ordering::Relaxed) + 1;
        if appended % self.flush_every == 0 {
            let accepted = self.flush.request_flush();
            debug!(appended, accepted, "flush trigger");
        }

        Recorded {
            record,
            decision,
            evicted,
        }
    }

    /// Tier distribution report, or `None` while the buffer is empty.
    #[must_use]
    pub fn distribution(&self) -> Option<DistributionReport> {
        analytics::distribution(&self.history.snapshot())
    }

    /// Quantile/recalibration report, or `None` while the buffer is empty.
    ///
    /// Uses the policy's sample floor so the published quantiles always
    /// agree with adaptive assignment.
    #[must_use]
    pub fn recalibration(&self) -> Option<RecalibrationReport> {
        analytics::recalibration(&self.history.snapshot(), self.policy.floor())
    }

    /// The last `n` records (clamped to the hard tail limit), oldest first.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<PredictionRecord> {
        self.history.recent(n)
    }

    /// Operational counters for health/status surfaces.
    #[must_use]
    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            history: self.history.stats(),
            flush: self.flush.counters().stats(),
            mode: self.policy.mode(),
            artifact_path: self.store.path().to_path_buf(),
        }
    }

    /// Stop the service: final flush, then the worker exits.
    pub async fn shutdown(self) {
        info!(buffered = self.history.len(), "prediction service shutting down");
        self.flush.shutdown().await;
    }
}

// =============================================================================
// Tests
// =============================================================================
