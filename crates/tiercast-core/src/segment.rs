//! Company-size segmentation — five ordered employee-count buckets.
//!
//! Thresholds and per-segment statistics are always scoped to a size segment:
//! a 40-person retailer and a 9,000-person enterprise convert at very
//! different base rates, so comparing their raw probabilities is meaningless.
//!
//! # Segment ranges
//!
//! | Segment    | Employees      |
//! |------------|----------------|
//! | Micro      | 0–99           |
//! | Small      | 100–299        |
//! | Medium     | 300–999        |
//! | Large      | 1000–2999      |
//! | Enterprise | 3000+          |
//!
//! Ranges are half-open: a boundary value (100, 300, 1000, 3000) belongs to
//! the higher segment. An employee count of zero is a valid "unknown"
//! sentinel and lands in `Micro`.

use serde::{Deserialize, Serialize};

// =============================================================================
// SizeSegment
// =============================================================================

/// One of five disjoint employee-count ranges.
///
/// Ordered from smallest to largest company size. The mapping from employee
/// count to segment is total: every non-negative count falls into exactly
/// one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeSegment {
    /// Fewer than 100 employees (includes the zero "unknown" sentinel).
    Micro,
    /// 100–299 employees.
    Small,
    /// 300–999 employees.
    Medium,
    /// 1000–2999 employees.
    Large,
    /// 3000 or more employees.
    Enterprise,
}

impl SizeSegment {
    /// Classify an employee count into its segment.
    ///
    /// Total and deterministic; the top range is unbounded above.
    #[must_use]
    pub fn for_employee_count(employees: u64) -> Self {
        match employees {
            0..=99 => Self::Micro,
            100..=299 => Self::Small,
            300..=999 => Self::Medium,
            1000..=2999 => Self::Large,
            _ => Self::Enterprise,
        }
    }

    /// Inclusive lower bound and exclusive upper bound of this segment.
    ///
    /// `None` for the upper bound means unbounded.
    #[must_use]
    pub fn employee_range(&self) -> (u64, Option<u64>) {
        match self {
            Self::Micro => (0, Some(100)),
            Self::Small => (100, Some(300)),
            Self::Medium => (300, Some(1000)),
            Self::Large => (1000, Some(3000)),
            Self::Enterprise => (3000, None),
        }
    }

    /// Short human-readable label (e.g., for CLI tables).
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Micro => "micro (<100)",
            Self::Small => "small (100-299)",
            Self::Medium => "medium (300-999)",
            Self::Large => "large (1000-2999)",
            Self::Enterprise => "enterprise (3000+)",
        }
    }

    /// All segments, smallest to largest.
    #[must_use]
    pub fn all() -> &'static [SizeSegment] {
        &[
            Self::Micro,
            Self::Small,
            Self::Medium,
            Self::Large,
            Self::Enterprise,
        ]
    }
}

impl std::fmt::Display for SizeSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Micro => write!(f, "micro"),
            Self::Small => write!(f, "small"),
            Self::Medium => write!(f, "medium"),
            Self::Large => write!(f, "large"),
            Self::Enterprise => write!(f, "enterprise"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
