//! Trend analysis
//!
//! Compares the mean of the first half of a sequence against the mean of the
//! second half.

use crate::analysis::mean;
use crate::types::Trend;

/// Percent change beyond which a sequence is considered to be moving
const TREND_CHANGE_PCT: f64 = 15.0;

/// Classify the direction of an ordered numeric sequence.
///
/// The split point is `ceil(n / 2)`, so for odd lengths the first half holds
/// the extra element. Sequences shorter than two elements and sequences whose
/// first-half mean is zero are `Stable`.
pub fn analyze_trend(values: &[f64]) -> Trend {
    if values.len() < 2 {
        return Trend::Stable;
    }

    let mid = values.len().div_ceil(2);
    let (first, second) = values.split_at(mid);

    let (Some(avg_first), Some(avg_second)) = (mean(first), mean(second)) else {
        return Trend::Stable;
    };

    if avg_first == 0.0 {
        return Trend::Stable;
    }

    let change = (avg_second - avg_first) / avg_first * 100.0;

    if change > TREND_CHANGE_PCT {
        Trend::Increasing
    } else if change < -TREND_CHANGE_PCT {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_sequences_are_stable() {
        assert_eq!(analyze_trend(&[]), Trend::Stable);
        assert_eq!(analyze_trend(&[42.0]), Trend::Stable);
    }

    #[test]
    fn test_zero_first_half_is_stable() {
        assert_eq!(analyze_trend(&[0.0, 0.0, 100.0, 100.0]), Trend::Stable);
        assert_eq!(analyze_trend(&[-5.0, 5.0, 1000.0]), Trend::Stable);
    }

    #[test]
    fn test_increasing() {
        // 10 -> 50 is a 400% change
        assert_eq!(analyze_trend(&[10.0, 10.0, 10.0, 50.0, 50.0, 50.0]), Trend::Increasing);
    }

    #[test]
    fn test_decreasing() {
        assert_eq!(analyze_trend(&[50.0, 50.0, 50.0, 10.0, 10.0, 10.0]), Trend::Decreasing);
    }

    #[test]
    fn test_small_oscillation_is_stable() {
        assert_eq!(analyze_trend(&[10.0, 11.0, 10.0, 11.0]), Trend::Stable);
    }

    #[test]
    fn test_odd_length_split() {
        // First half [100, 100], second half [116]: +16%
        assert_eq!(analyze_trend(&[100.0, 100.0, 116.0]), Trend::Increasing);
        // First half [100, 130], second half [130]: +13%
        assert_eq!(analyze_trend(&[100.0, 130.0, 130.0]), Trend::Stable);
    }

    #[test]
    fn test_near_threshold() {
        assert_eq!(analyze_trend(&[100.0, 114.0]), Trend::Stable);
        assert_eq!(analyze_trend(&[100.0, 116.0]), Trend::Increasing);
        assert_eq!(analyze_trend(&[100.0, 86.0]), Trend::Stable);
        assert_eq!(analyze_trend(&[100.0, 84.0]), Trend::Decreasing);
    }

    #[test]
    fn test_never_not_applicable() {
        for values in [vec![], vec![1.0], vec![1.0, 2.0], vec![3.0, 2.0, 1.0]] {
            assert_ne!(analyze_trend(&values), Trend::NotApplicable);
        }
    }
}
