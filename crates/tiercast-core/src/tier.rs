//! Outcome tiers and probability cut points.
//!
//! A scored probability is mapped to one of four ordered tiers via three
//! descending cut points. Each size segment carries its own built-in
//! [`ThresholdSet`], calibrated so that historically each tier held roughly
//! a quarter of that segment's mass.
//!
//! # Tie-break rule
//!
//! Qualification into a higher tier requires strictly greater than the cut
//! point; equality falls to the next-lower tier. The same rule applies to
//! static and dynamically recomputed thresholds.

use serde::{Deserialize, Serialize};

use crate::segment::SizeSegment;

// =============================================================================
// Tier
// =============================================================================

/// One of four ordered outcome buckets, `A` = highest likelihood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Top quarter of historical mass.
    A,
    /// High likelihood.
    B,
    /// Medium likelihood.
    C,
    /// Low likelihood.
    D,
}

impl Tier {
    /// Human-readable description, surfaced in reports and CLI output.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::A => "Top 25%",
            Self::B => "High",
            Self::C => "Medium",
            Self::D => "Low",
        }
    }

    /// Numeric rank: 0 = A (best) through 3 = D (worst).
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }

    /// All tiers, best to worst.
    #[must_use]
    pub fn all() -> &'static [Tier] {
        &[Self::A, Self::B, Self::C, Self::D]
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
            Self::C => write!(f, "C"),
            Self::D => write!(f, "D"),
        }
    }
}

// =============================================================================
// ThresholdSet
// =============================================================================

/// Three descending probability cut points defining the tier boundaries.
///
/// `p > a` → A; `p > b` → B; `p > c` → C; else D.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    /// Cut point into tier A.
    pub a: f64,
    /// Cut point into tier B.
    pub b: f64,
    /// Cut point into tier C.
    pub c: f64,
}

impl ThresholdSet {
    /// Create a threshold set from three cut points.
    #[must_use]
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// The built-in static threshold set for a segment.
    ///
    /// Values were calibrated offline from the scoring model's historical
    /// prediction quartiles and are fixed for the life of the process.
    #[must_use]
    pub fn builtin(segment: SizeSegment) -> Self {
        match segment {
            SizeSegment::Micro => Self::new(0.1986, 0.1249, 0.0577),
            SizeSegment::Small => Self::new(0.2174, 0.1286, 0.0577),
            SizeSegment::Medium => Self::new(0.1479, 0.0799, 0.0552),
            SizeSegment::Large => Self::new(0.1479, 0.0614, 0.0499),
            SizeSegment::Enterprise => Self::new(0.1704, 0.0577, 0.0532),
        }
    }

    /// Assign a tier to a probability.
    ///
    /// Strictly-greater-than comparisons: a probability exactly equal to a
    /// cut point falls to the lower tier.
    #[must_use]
    pub fn assign(&self, probability: f64) -> Tier {
        if probability > self.a {
            Tier::A
        } else if probability > self.b {
            Tier::B
        } else if probability > self.c {
            Tier::C
        } else {
            Tier::D
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
