//! Prediction records — one entry per scored request.
//!
//! A record captures what the scorer saw (the resolved feature vector), what
//! it answered (the probability), and what the policy decided (the tier),
//! together with the echoed request fields and the employee count used for
//! segmentation. Records are immutable once appended.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::SystemTime;

use crate::segment::SizeSegment;
use crate::tier::Tier;

/// Decimal places kept when storing a probability.
///
/// Four places match the precision the scoring pipeline reports; anything
/// beyond that is model noise.
const PROBABILITY_DECIMALS: f64 = 10_000.0;

// =============================================================================
// PredictionRecord
// =============================================================================

/// One scored request: inputs, probability, and the assigned tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Append instant, epoch milliseconds. Monotonically non-decreasing only
    /// under single-writer serialization; under concurrent writers the buffer
    /// order is lock-acquisition order, not wall-clock order.
    pub timestamp_ms: u64,
    /// Echoed request fields, opaque to the engine.
    pub request_summary: Value,
    /// The resolved feature vector actually passed to the scorer.
    pub features_used: Value,
    /// Scorer output in [0,1], rounded to 4 decimal places.
    pub probability: f64,
    /// Assigned outcome tier.
    pub tier: Tier,
    /// Resolved employee count used for segmentation (0 = unknown sentinel).
    pub employee_count: u64,
}

impl PredictionRecord {
    /// Build a record stamped with the current instant.
    ///
    /// The probability is clamped into [0,1] and rounded to 4 decimal
    /// places; upstream normalization is expected to deliver a valid value,
    /// so the clamp only defends the stored-range invariant.
    #[must_use]
    pub fn new(
        request_summary: Value,
        features_used: Value,
        probability: f64,
        tier: Tier,
        employee_count: u64,
    ) -> Self {
        Self {
            timestamp_ms: epoch_ms(),
            request_summary,
            features_used,
            probability: round_probability(probability),
            tier,
            employee_count,
        }
    }

    /// The size segment this record belongs to.
    #[must_use]
    pub fn segment(&self) -> SizeSegment {
        SizeSegment::for_employee_count(self.employee_count)
    }
}

/// Clamp into [0,1] and round to 4 decimal places.
#[must_use]
pub fn round_probability(probability: f64) -> f64 {
    let clamped = if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    };
    (clamped * PROBABILITY_DECIMALS).round() / PROBABILITY_DECIMALS
}

/// Current time as epoch milliseconds.
pub(crate) fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(probability: f64, employees: u64) -> PredictionRecord {
        PredictionRecord::new(
            json!({"industry": "Retail"}),
            json!({"global_employees": employees}),
            probability,
            Tier::B,
            employees,
        )
    }

    #[test]
    fn probability_is_rounded_to_four_places() {
        let r = sample(0.123_456_78, 50);
        assert!((r.probability - 0.1235).abs() < 1e-12);
    }

    #[test]
    fn probability_is_clamped() {
        assert!((sample(1.7, 50).probability - 1.0).abs() < f64::EPSILON);
        assert!(sample(-0.2, 50).probability.abs() < f64::EPSILON);
        assert!(sample(f64::NAN, 50).probability.abs() < f64::EPSILON);
    }

    #[test]
    fn segment_derives_from_employee_count() {
        assert_eq!(sample(0.1, 0).segment(), SizeSegment::Micro);
        assert_eq!(sample(0.1, 450).segment(), SizeSegment::Medium);
        assert_eq!(sample(0.1, 12_000).segment(), SizeSegment::Enterprise);
    }

    #[test]
    fn timestamp_is_set() {
        let r = sample(0.1, 10);
        assert!(r.timestamp_ms > 0);
    }

    #[test]
    fn serde_roundtrip_preserves_fields() {
        let r = sample(0.0832, 640);
        let json = serde_json::to_string(&r).unwrap();
        let back: PredictionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
