//! Session behavior analytics
//!
//! Pure functions turning a normalized session into the pieces of a behavioral
//! profile. Each component is independent; only the summary generator consumes
//! the outputs of the others.
//!
//! Pipeline: Payload JSON → Adapter → (Trend, Confidence, Classifier, Exploration) → Summary

pub mod classifier;
pub mod confidence;
pub mod exploration;
pub mod summary;
pub mod trend;

pub use classifier::classify_behavior;
pub use confidence::score_confidence;
pub use exploration::{classify_awareness, classify_variance, variance, ExplorationStats};
pub use summary::SummaryGenerator;
pub use trend::analyze_trend;

/// Round to the nearest integer, halves towards positive infinity.
///
/// This is the rounding the calculator front-end uses for displayed figures,
/// so persisted values line up with what the user saw.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Arithmetic mean, `None` for an empty slice
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.49), 2.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.51), -3.0);
        assert_eq!(round_half_up(0.0), 0.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }
}
