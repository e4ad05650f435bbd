//! tiercast-core: prediction telemetry and adaptive tiering engine
//!
//! This crate is the engine behind a prediction-serving endpoint: an opaque
//! scoring pipeline produces a probability, and tiercast-core maps it to a
//! discrete tier, records the outcome in a bounded concurrent history,
//! persists that history asynchronously, and derives live analytics from
//! which the tier thresholds can be recomputed dynamically.
//!
//! # Architecture
//!
//! ```text
//! request → (opaque scorer) → probability
//!              ↓
//!        TierPolicy (static or quantile-adaptive cut points)
//!              ↓
//!        PredictionHistory (bounded, mutex-guarded ring)
//!              ↓ every Nth append
//!        flush worker → JSON artifact (atomic replace)
//!
//! analytics reads a snapshot on demand → distribution / recalibration
//! ```
//!
//! # Modules
//!
//! - `segment`: employee-count size segmentation
//! - `tier`: outcome tiers and threshold cut points
//! - `record`: the per-prediction record type
//! - `history`: bounded, concurrency-safe prediction buffer
//! - `persist`: startup load and coalescing background flush
//! - `analytics`: distribution and quantile/recalibration reports
//! - `policy`: static-fallback / adaptive-override tier assignment
//! - `service`: the orchestrator and public entry points
//! - `config`: TOML configuration
//! - `logging`: tracing setup
//! - `error`: error types
//!
//! # Safety
//!
//! This crate forbids unsafe code.

#![forbid(unsafe_code)]

pub mod analytics;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod persist;
pub mod policy;
pub mod record;
pub mod segment;
pub mod service;
pub mod tier;

pub use error::{Error, Result};
pub use record::PredictionRecord;
pub use segment::SizeSegment;
pub use service::PredictionService;
pub use tier::{ThresholdSet, Tier};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
