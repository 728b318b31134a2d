//! Behavior classification by interaction volume

use crate::types::BehaviorType;

const DECIDED_MAX: usize = 2;
const METHODICAL_MAX: usize = 5;
const EXPLORER_MAX: usize = 10;

/// Bucket the number of explored configurations into a behavior label
pub fn classify_behavior(config_count: usize) -> BehaviorType {
    match config_count {
        0 => BehaviorType::NoInteraction,
        n if n <= DECIDED_MAX => BehaviorType::Decided,
        n if n <= METHODICAL_MAX => BehaviorType::Methodical,
        n if n <= EXPLORER_MAX => BehaviorType::Explorer,
        _ => BehaviorType::DeepExplorer,
    }
}
