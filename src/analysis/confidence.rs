//! Confidence scoring
//!
//! Dwell time on the final configuration relative to the whole session is the
//! primary signal. Sessions with very few configurations get a flat bonus,
//! since their dwell ratio says little on its own.

use crate::analysis::round_half_up;
use crate::types::ResolvedSnapshot;

/// Score returned when no dwell time was recorded at all
const DEFAULT_CONFIDENCE: u8 = 50;

/// Bonus for sessions that explored fewer than `FEW_CONFIGS` configurations
const FEW_CONFIGS_BONUS: f64 = 30.0;

/// Configuration count below which the bonus applies
const FEW_CONFIGS: usize = 3;

const MAX_CONFIDENCE: f64 = 100.0;

/// Estimate how settled the user was on their final configuration (0-100)
///
/// Formula: `min(100, round(final_ms / total_ms * 100 + bonus))`
pub fn score_confidence(history: &[ResolvedSnapshot], final_snapshot: Option<&ResolvedSnapshot>) -> u8 {
    // Summed in u128, a few u64 durations can already overflow
    let total_ms: u128 = history.iter().map(|s| u128::from(s.duration_ms)).sum();
    let final_ms = final_snapshot.map(|s| s.duration_ms).unwrap_or(0);

    if total_ms == 0 {
        return DEFAULT_CONFIDENCE;
    }

    let bonus = if history.len() < FEW_CONFIGS {
        FEW_CONFIGS_BONUS
    } else {
        0.0
    };

    let raw = final_ms as f64 / total_ms as f64 * 100.0 + bonus;
    round_half_up(raw).clamp(0.0, MAX_CONFIDENCE) as u8
}
