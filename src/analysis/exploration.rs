//! Exploration metrics
//!
//! Range/average statistics over the exploration dimension, a variance-derived
//! exploration intensity over the spread dimension, and a risk awareness bucket
//! over the average of the risk dimension.
//!
//! The intensity and awareness thresholds are calibrated to currency units
//! (squared, for the variance) and are fixed rather than derived from the data.

use crate::analysis::mean;
use crate::types::{ExplorationIntensity, RiskAwareness};
use serde::{Deserialize, Serialize};

/// Variance above which exploration is considered wide
const WIDE_VARIANCE: f64 = 1e8;

/// Variance above which exploration is considered moderate
const MODERATE_VARIANCE: f64 = 1e7;

/// Average risk value above which the user is highly risk-aware
const HIGH_AWARENESS: f64 = 150_000.0;

/// Average risk value above which the user is moderately risk-aware
const MODERATE_AWARENESS: f64 = 80_000.0;

/// Summary statistics over one tracked dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplorationStats {
    pub min: f64,
    pub max: f64,
    /// `max - min`
    pub range: f64,
    /// Arithmetic mean (unrounded)
    pub average: f64,
}

impl ExplorationStats {
    /// Compute statistics over a sequence; all zero for an empty sequence
    pub fn from_values(values: &[f64]) -> Self {
        let Some(average) = mean(values) else {
            return Self::default();
        };

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            min,
            max,
            range: max - min,
            average,
        }
    }
}

/// Population variance: mean of squared deviations from the mean
pub fn variance(values: &[f64]) -> f64 {
    let Some(avg) = mean(values) else {
        return 0.0;
    };
    values.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / values.len() as f64
}

/// Bucket a spread variance into an exploration intensity
pub fn classify_variance(variance: f64) -> ExplorationIntensity {
    if variance > WIDE_VARIANCE {
        ExplorationIntensity::WideExploration
    } else if variance > MODERATE_VARIANCE {
        ExplorationIntensity::ModerateExploration
    } else {
        ExplorationIntensity::Focused
    }
}

/// Bucket the average of the risk dimension into an awareness level
pub fn classify_awareness(average: f64) -> RiskAwareness {
    if average > HIGH_AWARENESS {
        RiskAwareness::HighAwareness
    } else if average > MODERATE_AWARENESS {
        RiskAwareness::ModerateAwareness
    } else {
        RiskAwareness::Conservative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stats() {
        let stats = ExplorationStats::from_values(&[120_000.0, 80_000.0, 250_000.0, 150_000.0]);
        assert_eq!(
            stats,
            ExplorationStats {
                min: 80_000.0,
                max: 250_000.0,
                range: 170_000.0,
                average: 150_000.0,
            }
        );
    }

    #[test]
    fn test_stats_empty_and_single() {
        assert_eq!(ExplorationStats::from_values(&[]), ExplorationStats::default());

        let single = ExplorationStats::from_values(&[13_500.0]);
        assert_eq!(single.range, 0.0);
        assert_eq!(single.average, 13_500.0);
    }

    #[test]
    fn test_variance() {
        assert_eq!(variance(&[]), 0.0);
        assert_eq!(variance(&[5.0, 5.0, 5.0]), 0.0);
        // mean 5, squared deviations 9 + 1 + 1 + 9 = 20, / 4
        assert_eq!(variance(&[2.0, 4.0, 6.0, 8.0]), 5.0);
    }

    #[test]
    fn test_variance_thresholds_are_strict() {
        assert_eq!(classify_variance(1e8), ExplorationIntensity::ModerateExploration);
        assert_eq!(classify_variance(1e8 + 1.0), ExplorationIntensity::WideExploration);
        assert_eq!(classify_variance(1e7), ExplorationIntensity::Focused);
        assert_eq!(classify_variance(1e7 + 1.0), ExplorationIntensity::ModerateExploration);
        assert_eq!(classify_variance(0.0), ExplorationIntensity::Focused);
    }

    #[test]
    fn test_fee_variance_from_eco_fees() {
        // Eco-fees of 0 and 30k: mean 15k, variance 2.25e8
        let fees = [0.0, 30_000.0];
        assert_eq!(classify_variance(variance(&fees)), ExplorationIntensity::WideExploration);
    }

    #[test]
    fn test_awareness_thresholds_are_strict() {
        assert_eq!(classify_awareness(150_000.0), RiskAwareness::ModerateAwareness);
        assert_eq!(classify_awareness(150_001.0), RiskAwareness::HighAwareness);
        assert_eq!(classify_awareness(80_000.0), RiskAwareness::Conservative);
        assert_eq!(classify_awareness(80_001.0), RiskAwareness::ModerateAwareness);
    }
}
