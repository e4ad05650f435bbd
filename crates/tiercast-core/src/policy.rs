//! Tier assignment policy — static fallback with adaptive override.
//!
//! Two modes, selected per call:
//!
//! - **Static**: the segment's built-in [`ThresholdSet`] applied directly.
//! - **Adaptive**: if the segment has enough buffered observations, the cut
//!   points recommended by the live quantiles replace the static ones;
//!   otherwise the call falls back to static. Effective thresholds can
//!   therefore shift between calls as history accumulates — assignment is a
//!   pure function of `(probability, segment, snapshot)`, not a constant
//!   mapping.
//!
//! The strictly-greater-than tie-break from [`ThresholdSet::assign`] holds
//! identically in both modes.

use serde::{Deserialize, Serialize};

use crate::analytics::{self, QUANTILE_FLOOR};
use crate::record::PredictionRecord;
use crate::segment::SizeSegment;
use crate::tier::{ThresholdSet, Tier};

// =============================================================================
// Types
// =============================================================================

/// Which threshold source the policy prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// Always use the built-in static thresholds.
    Static,
    /// Use quantile-derived thresholds when the segment has enough history.
    Adaptive,
}

/// Where the thresholds for one assignment actually came from.
///
/// In adaptive mode a thin segment still resolves to `Static`; the source
/// records what happened, not what was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSource {
    /// Built-in static cut points.
    Static,
    /// Cut points recomputed from buffered quantiles.
    Dynamic,
}

/// Outcome of one tier assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierDecision {
    /// The assigned tier.
    pub tier: Tier,
    /// The segment the probability was scoped to.
    pub segment: SizeSegment,
    /// The cut points that were applied.
    pub thresholds: ThresholdSet,
    /// Whether those cut points were static or dynamically derived.
    pub source: ThresholdSource,
}

// =============================================================================
// TierPolicy
// =============================================================================

/// Assigns tiers to probabilities, optionally adapting cut points to the
/// observed distribution.
///
/// Owns no state: each adaptive call derives its thresholds from the
/// snapshot it is handed, so a fresh policy per test needs no setup.
#[derive(Debug, Clone, Copy)]
pub struct TierPolicy {
    mode: ThresholdMode,
    floor: usize,
}

impl TierPolicy {
    /// Create a policy in the given mode with the default quantile floor.
    #[must_use]
    pub fn new(mode: ThresholdMode) -> Self {
        Self {
            mode,
            floor: QUANTILE_FLOOR,
        }
    }

    /// Override the per-segment sample floor for dynamic thresholds.
    #[must_use]
    pub fn with_floor(mut self, floor: usize) -> Self {
        self.floor = floor;
        self
    }

    /// The configured mode.
    #[must_use]
    pub fn mode(&self) -> ThresholdMode {
        self.mode
    }

    /// The configured per-segment sample floor.
    #[must_use]
    pub fn floor(&self) -> usize {
        self.floor
    }

    /// Assign a tier to a probability for the given employee count.
    ///
    /// `snapshot` is only consulted in adaptive mode; static mode ignores it.
    #[must_use]
    pub fn assign(
        &self,
        probability: f64,
        employee_count: u64,
        snapshot: &[PredictionRecord],
    ) -> TierDecision {
        let segment = SizeSegment::for_employee_count(employee_count);
        let (thresholds, source) = match self.mode {
            ThresholdMode::Static => (ThresholdSet::builtin(segment), ThresholdSource::Static),
            ThresholdMode::Adaptive => self.dynamic_thresholds(segment, snapshot).map_or(
                (ThresholdSet::builtin(segment), ThresholdSource::Static),
                |t| (t, ThresholdSource::Dynamic),
            ),
        };
        TierDecision {
            tier: thresholds.assign(probability),
            segment,
            thresholds,
            source,
        }
    }

    /// Quantile-derived thresholds for a segment, or `None` below the floor.
    #[must_use]
    pub fn dynamic_thresholds(
        &self,
        segment: SizeSegment,
        snapshot: &[PredictionRecord],
    ) -> Option<ThresholdSet> {
        analytics::segment_quantiles(snapshot, segment, self.floor).map(|sq| sq.recommended)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(probability: f64, employees: u64) -> PredictionRecord {
        PredictionRecord::new(json!({}), json!({}), probability, Tier::C, employees)
    }

    // -- Static mode ------------------------------------------------------------

    #[test]
    fn static_mode_ignores_snapshot() {
        let policy = TierPolicy::new(ThresholdMode::Static);
        let snapshot: Vec<PredictionRecord> =
            (0..20).map(|i| record(f64::from(i) / 20.0, 50)).collect();
        let decision = policy.assign(0.25, 50, &snapshot);
        assert_eq!(decision.source, ThresholdSource::Static);
        assert_eq!(decision.thresholds, ThresholdSet::builtin(SizeSegment::Micro));
        assert_eq!(decision.tier, Tier::A); // 0.25 > 0.1986
    }

    #[test]
    fn static_assignment_uses_segment_thresholds() {
        let policy = TierPolicy::new(ThresholdMode::Static);
        // 0.16 is tier A for Medium (cut 0.1479) but tier B for Micro (cut 0.1986).
        assert_eq!(policy.assign(0.16, 500, &[]).tier, Tier::A);
        assert_eq!(policy.assign(0.16, 50, &[]).tier, Tier::B);
    }

    // -- Adaptive mode ----------------------------------------------------------

    #[test]
    fn adaptive_mode_uses_quantile_thresholds() {
        let policy = TierPolicy::new(ThresholdMode::Adaptive);
        // Sorted micro probabilities [0.01, 0.05, 0.10, 0.15, 0.20]:
        // recommended cut points a=0.15, b=0.10, c=0.05.
        let snapshot = vec![
            record(0.10, 10),
            record(0.05, 20),
            record(0.20, 30),
            record(0.15, 40),
            record(0.01, 50),
        ];
        let decision = policy.assign(0.12, 60, &snapshot);
        assert_eq!(decision.source, ThresholdSource::Dynamic);
        assert_eq!(decision.tier, Tier::B); // 0.10 < 0.12 <= 0.15
        assert!((decision.thresholds.a - 0.15).abs() < 1e-12);
        assert!((decision.thresholds.b - 0.10).abs() < 1e-12);
        assert!((decision.thresholds.c - 0.05).abs() < 1e-12);
    }

    #[test]
    fn adaptive_falls_back_below_floor() {
        let policy = TierPolicy::new(ThresholdMode::Adaptive);
        // Only 3 micro observations: below the floor of 4.
        let snapshot = vec![record(0.9, 10), record(0.9, 20), record(0.9, 30)];
        let adaptive = policy.assign(0.25, 50, &snapshot);
        let fixed = TierPolicy::new(ThresholdMode::Static).assign(0.25, 50, &snapshot);
        assert_eq!(adaptive.source, ThresholdSource::Static);
        assert_eq!(adaptive.tier, fixed.tier);
        assert_eq!(adaptive.thresholds, fixed.thresholds);
    }

    #[test]
    fn adaptive_fallback_is_per_segment() {
        let policy = TierPolicy::new(ThresholdMode::Adaptive);
        // Micro has 4 observations, Enterprise has 1.
        let mut snapshot: Vec<PredictionRecord> =
            (0..4).map(|i| record(f64::from(i + 1) / 10.0, 10)).collect();
        snapshot.push(record(0.5, 5000));

        assert_eq!(
            policy.assign(0.2, 50, &snapshot).source,
            ThresholdSource::Dynamic
        );
        assert_eq!(
            policy.assign(0.2, 5000, &snapshot).source,
            ThresholdSource::Static
        );
    }

    #[test]
    fn dynamic_tie_break_is_strictly_greater_than() {
        let policy = TierPolicy::new(ThresholdMode::Adaptive);
        // Sorted [0.1, 0.2, 0.3, 0.4]: recommended a=0.4, b=0.3, c=0.2.
        let snapshot: Vec<PredictionRecord> =
            (1..=4).map(|i| record(f64::from(i) / 10.0, 10)).collect();
        // Exactly on the A cut point falls to B.
        assert_eq!(policy.assign(0.4, 50, &snapshot).tier, Tier::B);
        assert_eq!(policy.assign(0.41, 50, &snapshot).tier, Tier::A);
    }

    #[test]
    fn custom_floor_is_honored() {
        let policy = TierPolicy::new(ThresholdMode::Adaptive).with_floor(6);
        let snapshot: Vec<PredictionRecord> =
            (0..5).map(|i| record(f64::from(i) / 10.0, 10)).collect();
        assert_eq!(policy.assign(0.2, 50, &snapshot).source, ThresholdSource::Static);
    }
}
