//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Bufferbloat grade derived from latency inflation under load.
///
/// Variants are ordered from best to worst, so `max()` over a run yields the
/// worst grade observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BufferbloatGrade {
    /// Inflation of at most 5 ms
    S,
    /// At most 30 ms
    A,
    /// At most 60 ms
    B,
    /// At most 200 ms
    C,
    /// At most 400 ms
    D,
    /// More than 400 ms
    F,
}

impl BufferbloatGrade {
    /// All grades, best first
    pub const ALL: [BufferbloatGrade; 6] = [Self::S, Self::A, Self::B, Self::C, Self::D, Self::F];

    /// Classify a latency delta (during minus before) in milliseconds.
    ///
    /// Upper bounds are inclusive and the first match wins, so negative deltas
    /// land in `S`. Anything that fails every bound (including NaN) is `F`.
    pub fn from_delta(delta_ms: f64) -> Self {
        if delta_ms <= 5.0 {
            Self::S
        } else if delta_ms <= 30.0 {
            Self::A
        } else if delta_ms <= 60.0 {
            Self::B
        } else if delta_ms <= 200.0 {
            Self::C
        } else if delta_ms <= 400.0 {
            Self::D
        } else {
            Self::F
        }
    }

    /// Grade a trial from its idle and loaded latencies; `None` when either is missing
    pub fn for_latencies(before_ms: Option<f64>, during_ms: Option<f64>) -> Option<Self> {
        match (before_ms, during_ms) {
            (Some(before), Some(during)) => Some(Self::from_delta(during - before)),
            _ => None,
        }
    }

    /// Inclusive upper bound of the grade's bucket in milliseconds
    pub fn upper_bound_ms(&self) -> Option<f64> {
        match self {
            Self::S => Some(5.0),
            Self::A => Some(30.0),
            Self::B => Some(60.0),
            Self::C => Some(200.0),
            Self::D => Some(400.0),
            Self::F => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }

    /// Get descriptive text
    pub fn description(&self) -> &'static str {
        match self {
            Self::S => "No noticeable bufferbloat",
            Self::A => "Minimal bufferbloat",
            Self::B => "Mild bufferbloat",
            Self::C => "Moderate bufferbloat",
            Self::D => "Severe bufferbloat",
            Self::F => "Extreme bufferbloat",
        }
    }
}

impl fmt::Display for BufferbloatGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display text for a grade that could not be computed
pub const GRADE_NOT_APPLICABLE: &str = "N/A";

/// Which probe of a trial a latency sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeStage {
    /// Idle link, before the speed test
    Before,
    /// Right after the load-generating transfer
    During,
    /// After the recovery interval
    After,
}

impl ProbeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::During => "during",
            Self::After => "after",
        }
    }
}

impl fmt::Display for ProbeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_grade_boundaries() {
        let cases = [
            (5.0, BufferbloatGrade::S),
            (5.01, BufferbloatGrade::A),
            (30.0, BufferbloatGrade::A),
            (30.01, BufferbloatGrade::B),
            (60.0, BufferbloatGrade::B),
            (60.01, BufferbloatGrade::C),
            (200.0, BufferbloatGrade::C),
            (200.01, BufferbloatGrade::D),
            (400.0, BufferbloatGrade::D),
            (400.01, BufferbloatGrade::F),
        ];

        for (delta, expected) in cases {
            assert_eq!(BufferbloatGrade::from_delta(delta), expected, "delta {}", delta);
        }
    }

    #[test]
    fn test_negative_delta_is_s() {
        assert_eq!(BufferbloatGrade::from_delta(-100.0), BufferbloatGrade::S);
        assert_eq!(BufferbloatGrade::from_delta(0.0), BufferbloatGrade::S);
    }

    #[test]
    fn test_missing_latency_is_not_graded() {
        assert_eq!(BufferbloatGrade::for_latencies(None, Some(10.0)), None);
        assert_eq!(BufferbloatGrade::for_latencies(Some(10.0), None), None);
        assert_eq!(BufferbloatGrade::for_latencies(None, None), None);
        assert_eq!(
            BufferbloatGrade::for_latencies(Some(20.0), Some(55.0)),
            Some(BufferbloatGrade::B)
        );
    }

    #[test]
    fn test_grade_ordering_worst_last() {
        assert!(BufferbloatGrade::S < BufferbloatGrade::A);
        assert!(BufferbloatGrade::D < BufferbloatGrade::F);
        assert_eq!(BufferbloatGrade::ALL.iter().max(), Some(&BufferbloatGrade::F));
    }

    #[test]
    fn test_grade_display() {
        assert_eq!(BufferbloatGrade::C.to_string(), "C");
        assert_eq!(ProbeStage::During.to_string(), "during");
    }

    proptest! {
        #[test]
        fn grade_respects_bucket_bounds(delta in -1_000.0f64..10_000.0) {
            let grade = BufferbloatGrade::from_delta(delta);
            if let Some(upper) = grade.upper_bound_ms() {
                prop_assert!(delta <= upper);
            } else {
                prop_assert!(delta > 400.0);
            }
            // The next-better grade's bound must have been exceeded
            let idx = BufferbloatGrade::ALL.iter().position(|g| *g == grade).unwrap();
            if idx > 0 {
                let better = BufferbloatGrade::ALL[idx - 1];
                prop_assert!(delta > better.upper_bound_ms().unwrap());
            }
        }

        #[test]
        fn grade_is_monotonic(a in -500.0f64..1_000.0, b in -500.0f64..1_000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(BufferbloatGrade::from_delta(lo) <= BufferbloatGrade::from_delta(hi));
        }
    }
}
