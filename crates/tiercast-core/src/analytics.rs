//! Read-only analytics over a history snapshot.
//!
//! Two reports, both computed from a single point-in-time snapshot:
//!
//! - **Distribution**: tier counts and percentages overall and per size
//!   segment, with per-segment probability summary statistics.
//! - **Recalibration**: per-segment probability quartiles with the static
//!   thresholds echoed alongside the quantile-derived recommendation. This
//!   is both a human-facing recalibration suggestion and the data source
//!   for adaptive tier assignment.
//!
//! # Quantile rule
//!
//! All order statistics use the sorted-sequence index rule: for an
//! ascending-sorted sequence of length `n`, the median is the element at
//! index `n / 2` and the quartiles sit at `n / 4` and `3 * n / 4` (integer
//! division, zero-based, no interpolation between neighbors). The rule is
//! deliberately simple — downstream consumers depend on exact numeric
//! parity, not on any particular library's interpolation scheme.
//!
//! Quantiles are withheld for segments with fewer than [`QUANTILE_FLOOR`]
//! observations; a quartile of a two-element sample is noise, not signal.

use serde::Serialize;

use crate::record::PredictionRecord;
use crate::segment::SizeSegment;
use crate::tier::{ThresholdSet, Tier};

/// Minimum per-segment sample count below which quantiles are withheld.
pub const QUANTILE_FLOOR: usize = 4;

// =============================================================================
// Report types
// =============================================================================

/// Count and share of one tier within a population.
#[derive(Debug, Clone, Serialize)]
pub struct TierShare {
    /// The tier.
    pub tier: Tier,
    /// Human-readable tier description.
    pub description: &'static str,
    /// Number of records in this tier.
    pub count: usize,
    /// Share of the population, in percent.
    pub percentage: f64,
}

/// Probability summary statistics for one segment.
#[derive(Debug, Clone, Serialize)]
pub struct ProbabilitySummary {
    /// Smallest observed probability.
    pub min: f64,
    /// Largest observed probability.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Element at index `n / 2` of the ascending sort (lower-middle for
    /// even `n`, never an average of two neighbors).
    pub median: f64,
}

/// Tier breakdown and probability summary for one non-empty segment.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentDistribution {
    /// The size segment.
    pub segment: SizeSegment,
    /// Number of records observed in this segment.
    pub count: usize,
    /// Per-tier counts and percentages within this segment.
    pub tiers: Vec<TierShare>,
    /// Probability summary statistics for this segment.
    pub probabilities: ProbabilitySummary,
}

/// Tier distribution report: overall breakdown plus per-segment detail.
///
/// Segments with zero observations are omitted — absence, not a zero-filled
/// entry, so a consumer can't mistake "no data" for "all tier D".
#[derive(Debug, Clone, Serialize)]
pub struct DistributionReport {
    /// Total number of buffered records.
    pub total: usize,
    /// Overall per-tier counts and percentages.
    pub tiers: Vec<TierShare>,
    /// Per-segment breakdowns, smallest segment first, empty segments omitted.
    pub segments: Vec<SegmentDistribution>,
}

/// Observed quartiles and threshold recommendation for one segment.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentQuantiles {
    /// The size segment.
    pub segment: SizeSegment,
    /// Number of observations backing these quantiles.
    pub sample_count: usize,
    /// First quartile (sorted index `n / 4`).
    pub q25: f64,
    /// Median (sorted index `n / 2`).
    pub q50: f64,
    /// Third quartile (sorted index `3 * n / 4`).
    pub q75: f64,
    /// The built-in static thresholds, echoed for comparison.
    pub current: ThresholdSet,
    /// Quantile-derived thresholds: `(a = q75, b = q50, c = q25)`, i.e. cut
    /// points under which each tier would have held roughly a quarter of
    /// the observed mass.
    pub recommended: ThresholdSet,
}

/// Quantile/recalibration report across all segments with enough samples.
#[derive(Debug, Clone, Serialize)]
pub struct RecalibrationReport {
    /// Total number of buffered records.
    pub total: usize,
    /// Per-segment quantiles, smallest segment first. Segments below the
    /// sample floor are omitted.
    pub segments: Vec<SegmentQuantiles>,
}

// =============================================================================
// Report computation
// =============================================================================

/// Compute the tier distribution report from a snapshot.
///
/// Returns `None` for an empty snapshot — an explicit "no data yet" signal,
/// never a zero-filled report.
#[must_use]
pub fn distribution(records: &[PredictionRecord]) -> Option<DistributionReport> {
    if records.is_empty() {
        return None;
    }

    let mut segments = Vec::new();
    for &segment in SizeSegment::all() {
        let members: Vec<&PredictionRecord> = records
            .iter()
            .filter(|r| r.segment() == segment)
            .collect();
        if members.is_empty() {
            continue;
        }
        segments.push(SegmentDistribution {
            segment,
            count: members.len(),
            tiers: tier_shares(members.iter().map(|r| r.tier)),
            probabilities: summarize(members.iter().map(|r| r.probability).collect()),
        });
    }

    Some(DistributionReport {
        total: records.len(),
        tiers: tier_shares(records.iter().map(|r| r.tier)),
        segments,
    })
}

/// Compute the quantile/recalibration report from a snapshot.
///
/// Returns `None` for an empty snapshot. Individual segments with fewer
/// than `floor` observations are omitted rather than estimated.
#[must_use]
pub fn recalibration(records: &[PredictionRecord], floor: usize) -> Option<RecalibrationReport> {
    if records.is_empty() {
        return None;
    }

    let mut segments = Vec::new();
    for &segment in SizeSegment::all() {
        if let Some(sq) = segment_quantiles(records, segment, floor) {
            segments.push(sq);
        }
    }

    Some(RecalibrationReport {
        total: records.len(),
        segments,
    })
}

/// Quartiles for one segment, or `None` below the sample floor.
///
/// Shared between the recalibration report and adaptive tier assignment so
/// both always agree on the recommended cut points.
#[must_use]
pub fn segment_quantiles(
    records: &[PredictionRecord],
    segment: SizeSegment,
    floor: usize,
) -> Option<SegmentQuantiles> {
    let mut probs = segment_probabilities(records, segment);
    if probs.len() < floor {
        return None;
    }
    probs.sort_by(f64::total_cmp);

    let n = probs.len();
    let q25 = probs[n / 4];
    let q50 = probs[n / 2];
    let q75 = probs[3 * n / 4];

    Some(SegmentQuantiles {
        segment,
        sample_count: n,
        q25,
        q50,
        q75,
        current: ThresholdSet::builtin(segment),
        recommended: ThresholdSet::new(q75, q50, q25),
    })
}

// =============================================================================
// Helpers
// =============================================================================

fn segment_probabilities(records: &[PredictionRecord], segment: SizeSegment) -> Vec<f64> {
    records
        .iter()
        .filter(|r| r.segment() == segment)
        .map(|r| r.probability)
        .collect()
}

fn tier_shares(tiers: impl Iterator<Item = Tier>) -> Vec<TierShare> {
    let mut counts = [0usize; 4];
    let mut total = 0usize;
    for tier in tiers {
        counts[tier.rank() as usize] += 1;
        total += 1;
    }
    Tier::all()
        .iter()
        .map(|&tier| {
            let count = counts[tier.rank() as usize];
            TierShare {
                tier,
                description: tier.description(),
                count,
                percentage: if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64 * 100.0
                },
            }
        })
        .collect()
}

fn summarize(mut probs: Vec<f64>) -> ProbabilitySummary {
    probs.sort_by(f64::total_cmp);
    let n = probs.len();
    let sum: f64 = probs.iter().sum();
    ProbabilitySummary {
        min: probs[0],
        max: probs[n - 1],
        mean: sum / n as f64,
        median: probs[n / 2],
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::Tier;
    use serde_json::json;

    fn record(probability: f64, employees: u64) -> PredictionRecord {
        let tier = ThresholdSet::builtin(SizeSegment::for_employee_count(employees))
            .assign(probability);
        PredictionRecord::new(json!({}), json!({}), probability, tier, employees)
    }

    // -- Emptiness --------------------------------------------------------------

    #[test]
    fn empty_snapshot_yields_no_reports() {
        assert!(distribution(&[]).is_none());
        assert!(recalibration(&[], QUANTILE_FLOOR).is_none());
    }

    // -- Distribution -----------------------------------------------------------

    #[test]
    fn distribution_counts_and_percentages() {
        let records = vec![
            record(0.50, 50), // Micro, A
            record(0.50, 60), // Micro, A
            record(0.01, 70), // Micro, D
            record(0.30, 5000), // Enterprise, A
        ];
        let report = distribution(&records).unwrap();
        assert_eq!(report.total, 4);

        let a = report.tiers.iter().find(|s| s.tier == Tier::A).unwrap();
        assert_eq!(a.count, 3);
        assert!((a.percentage - 75.0).abs() < 1e-9);

        let d = report.tiers.iter().find(|s| s.tier == Tier::D).unwrap();
        assert_eq!(d.count, 1);
        assert!((d.percentage - 25.0).abs() < 1e-9);
    }

    #[test]
    fn distribution_omits_empty_segments() {
        let records = vec![record(0.2, 50), record(0.1, 4000)];
        let report = distribution(&records).unwrap();
        let present: Vec<SizeSegment> = report.segments.iter().map(|s| s.segment).collect();
        assert_eq!(present, vec![SizeSegment::Micro, SizeSegment::Enterprise]);
    }

    #[test]
    fn distribution_segment_summary_stats() {
        let records = vec![
            record(0.10, 10),
            record(0.05, 20),
            record(0.20, 30),
            record(0.15, 40),
            record(0.01, 50),
        ];
        let report = distribution(&records).unwrap();
        let micro = &report.segments[0];
        assert_eq!(micro.segment, SizeSegment::Micro);
        assert_eq!(micro.count, 5);
        let p = &micro.probabilities;
        assert!((p.min - 0.01).abs() < 1e-12);
        assert!((p.max - 0.20).abs() < 1e-12);
        assert!((p.mean - 0.102).abs() < 1e-9);
        // Middle element of the sorted sequence, not an interpolated value.
        assert!((p.median - 0.10).abs() < 1e-12);
    }

    #[test]
    fn median_is_lower_middle_for_even_counts() {
        let records = vec![
            record(0.1, 10),
            record(0.2, 20),
            record(0.3, 30),
            record(0.4, 40),
        ];
        let report = distribution(&records).unwrap();
        // Sorted [0.1, 0.2, 0.3, 0.4], index 4/2 = 2.
        assert!((report.segments[0].probabilities.median - 0.3).abs() < 1e-12);
    }

    // -- Recalibration ----------------------------------------------------------

    #[test]
    fn quantiles_use_sorted_index_rule() {
        // Worked example: sorted [0.01, 0.05, 0.10, 0.15, 0.20], n = 5.
        let records = vec![
            record(0.10, 10),
            record(0.05, 20),
            record(0.20, 30),
            record(0.15, 40),
            record(0.01, 50),
        ];
        let report = recalibration(&records, QUANTILE_FLOOR).unwrap();
        assert_eq!(report.segments.len(), 1);
        let micro = &report.segments[0];
        assert_eq!(micro.sample_count, 5);
        assert!((micro.q25 - 0.05).abs() < 1e-12); // index 1
        assert!((micro.q50 - 0.10).abs() < 1e-12); // index 2
        assert!((micro.q75 - 0.15).abs() < 1e-12); // index 3
    }

    #[test]
    fn recommended_thresholds_map_quartiles() {
        let records: Vec<PredictionRecord> =
            (0..8).map(|i| record(f64::from(i) / 100.0, 10)).collect();
        let report = recalibration(&records, QUANTILE_FLOOR).unwrap();
        let micro = &report.segments[0];
        assert!((micro.recommended.a - micro.q75).abs() < f64::EPSILON);
        assert!((micro.recommended.b - micro.q50).abs() < f64::EPSILON);
        assert!((micro.recommended.c - micro.q25).abs() < f64::EPSILON);
        assert_eq!(micro.current, ThresholdSet::builtin(SizeSegment::Micro));
    }

    #[test]
    fn segments_below_floor_are_omitted() {
        let mut records: Vec<PredictionRecord> =
            (0..4).map(|i| record(f64::from(i) / 10.0, 10)).collect();
        // Three Enterprise observations: below the floor of 4.
        records.extend((0..3).map(|i| record(f64::from(i) / 10.0, 5000)));

        let report = recalibration(&records, QUANTILE_FLOOR).unwrap();
        let present: Vec<SizeSegment> = report.segments.iter().map(|s| s.segment).collect();
        assert_eq!(present, vec![SizeSegment::Micro]);
    }

    #[test]
    fn quantiles_are_order_independent() {
        let probs = [0.42, 0.07, 0.19, 0.88, 0.33, 0.01, 0.64];
        let forward: Vec<PredictionRecord> =
            probs.iter().map(|&p| record(p, 10)).collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = segment_quantiles(&forward, SizeSegment::Micro, QUANTILE_FLOOR).unwrap();
        let b = segment_quantiles(&reversed, SizeSegment::Micro, QUANTILE_FLOOR).unwrap();
        assert!((a.q25 - b.q25).abs() < f64::EPSILON);
        assert!((a.q50 - b.q50).abs() < f64::EPSILON);
        assert!((a.q75 - b.q75).abs() < f64::EPSILON);
    }

    #[test]
    fn floor_boundary_exactly_four_samples() {
        let records: Vec<PredictionRecord> =
            (0..4).map(|i| record(f64::from(i) / 10.0, 10)).collect();
        let sq = segment_quantiles(&records, SizeSegment::Micro, QUANTILE_FLOOR).unwrap();
        // Sorted [0.0, 0.1, 0.2, 0.3]: indices 1, 2, 3.
        assert!((sq.q25 - 0.1).abs() < 1e-12);
        assert!((sq.q50 - 0.2).abs() < 1e-12);
        assert!((sq.q75 - 0.3).abs() < 1e-12);
    }

    #[test]
    fn reports_serialize_to_json() {
        let records = vec![record(0.1, 10), record(0.2, 500)];
        let report = distribution(&records).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total"], 2);
        assert!(json["segments"].as_array().unwrap().len() == 2);
    }
}
