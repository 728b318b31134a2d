//! Summary generation
//!
//! The summary is an ordered list of independent rules. Each rule looks at the
//! analysis results and the final snapshot and emits zero or one fragment; the
//! fragments are joined with ". " and closed with a period.

use crate::analysis::round_half_up;
use crate::config::DomainConfig;
use crate::types::{format_number, BehaviorType, ResolvedSnapshot, ScenarioValue};

/// Confidence at or above which the high confidence phrase is used
const HIGH_CONFIDENCE: u8 = 80;

/// Confidence at or above which the moderate confidence phrase is used
const MODERATE_CONFIDENCE: u8 = 50;

/// Everything the summary rules may look at
#[derive(Debug, Clone, Copy)]
pub struct SummaryInput<'a> {
    pub behavior: BehaviorType,
    pub confidence: u8,
    pub exploration_range: f64,
    pub final_snapshot: Option<&'a ResolvedSnapshot>,
}

type Rule = fn(&SummaryInput<'_>, &DomainConfig) -> Option<String>;

/// Rules in output order
const RULES: [Rule; 6] = [
    behavior_fragment,
    confidence_fragment,
    range_fragment,
    selector_fragment,
    scale_fragment,
    outcome_fragment,
];

/// Deterministic summary generator for one domain
pub struct SummaryGenerator<'a> {
    config: &'a DomainConfig,
}

impl<'a> SummaryGenerator<'a> {
    pub fn new(config: &'a DomainConfig) -> Self {
        Self { config }
    }

    /// Fragments emitted by the rules, in order
    pub fn fragments(&self, input: &SummaryInput<'_>) -> Vec<String> {
        RULES
            .iter()
            .filter_map(|rule| rule(input, self.config))
            .collect()
    }

    /// Compose the one-sentence summary
    pub fn generate(&self, input: &SummaryInput<'_>) -> String {
        if input.behavior == BehaviorType::NoInteraction {
            return self.config.phrases.no_interaction.clone();
        }
        format!("{}.", self.fragments(input).join(". "))
    }
}

fn thousands(value: f64) -> String {
    format_number(round_half_up(value / 1000.0))
}

fn behavior_fragment(input: &SummaryInput<'_>, config: &DomainConfig) -> Option<String> {
    let phrases = &config.phrases;
    match input.behavior {
        BehaviorType::NoInteraction => None,
        BehaviorType::Decided => Some(phrases.decided.clone()),
        BehaviorType::DeepExplorer => Some(phrases.deep_explorer.clone()),
        other => Some(format!("{} approach", other.label())),
    }
}

fn confidence_fragment(input: &SummaryInput<'_>, config: &DomainConfig) -> Option<String> {
    let phrases = &config.phrases;
    let phrase = if input.confidence >= HIGH_CONFIDENCE {
        &phrases.high_confidence
    } else if input.confidence >= MODERATE_CONFIDENCE {
        &phrases.moderate_confidence
    } else {
        &phrases.low_confidence
    };
    Some(phrase.clone())
}

fn range_fragment(input: &SummaryInput<'_>, config: &DomainConfig) -> Option<String> {
    (input.exploration_range > config.exploration_range_threshold)
        .then(|| config.phrases.wide_range.wrap(thousands(input.exploration_range)))
}

fn selector_fragment(input: &SummaryInput<'_>, config: &DomainConfig) -> Option<String> {
    let selector = input.final_snapshot?.selector.as_ref()?;
    let phrases = &config.phrases;
    let rendered = match selector {
        ScenarioValue::Text(text) => text.clone(),
        ScenarioValue::Number(n) => format!("{}{}", phrases.numeric_selector, format_number(*n)),
    };
    Some(format!("{}{}", phrases.selector, rendered))
}

fn scale_fragment(input: &SummaryInput<'_>, config: &DomainConfig) -> Option<String> {
    let scale = input.final_snapshot?.reported_scale?;
    let tiers = &config.phrases.scale_tiers;
    let tier = if scale >= config.scale_tiers.high_cut {
        &tiers[2]
    } else if scale >= config.scale_tiers.low_cut {
        &tiers[1]
    } else {
        &tiers[0]
    };
    Some(tier.clone())
}

fn outcome_fragment(input: &SummaryInput<'_>, config: &DomainConfig) -> Option<String> {
    let outcome = input.final_snapshot?.reported_outcome?;
    Some(config.phrases.outcome.wrap(thousands(outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn final_snapshot(
        reported_outcome: Option<f64>,
        reported_scale: Option<f64>,
        selector: Option<ScenarioValue>,
    ) -> ResolvedSnapshot {
        ResolvedSnapshot {
            duration_ms: 60_000,
            outcome: reported_outcome.unwrap_or(0.0),
            scale: reported_scale.unwrap_or(0.0),
            spread: None,
            risk: None,
            reported_outcome,
            reported_scale,
            selector,
        }
    }

    #[test]
    fn test_minimal_summary() {
        let config = DomainConfig::savings_calculator();
        let generator = SummaryGenerator::new(&config);
        let input = SummaryInput {
            behavior: BehaviorType::Methodical,
            confidence: 40,
            exploration_range: 0.0,
            final_snapshot: None,
        };
        assert_eq!(generator.generate(&input), "Methodical approach. still exploring.");
    }

    #[test]
    fn test_full_savings_summary() {
        let config = DomainConfig::savings_calculator();
        let generator = SummaryGenerator::new(&config);
        let snapshot = final_snapshot(Some(245_600.0), Some(3_000.0), None);
        let input = SummaryInput {
            behavior: BehaviorType::Decided,
            confidence: 90,
            exploration_range: 150_400.0,
            final_snapshot: Some(&snapshot),
        };
        assert_eq!(
            generator.generate(&input),
            "Quick decision maker - knew their numbers. high confidence in final config. \
             wide savings range explored (£150k). medium operation. settled on £246k savings."
        );
    }

    #[test]
    fn test_full_tyre_summary() {
        let config = DomainConfig::tyre_epr();
        let generator = SummaryGenerator::new(&config);
        let snapshot = final_snapshot(
            Some(1_250_000.0),
            Some(120_000.0),
            Some(ScenarioValue::Text("Year 3".to_string())),
        );
        let input = SummaryInput {
            behavior: BehaviorType::DeepExplorer,
            confidence: 55,
            exploration_range: 106_500.0,
            final_snapshot: Some(&snapshot),
        };
        assert_eq!(
            generator.fragments(&input),
            vec![
                "Thoroughly explored multi-year scenarios".to_string(),
                "moderate confidence".to_string(),
                "wide volume range explored (107k tonnes)".to_string(),
                "settled on Year 3".to_string(),
                "targeting scale deployment (100k+ t)".to_string(),
                "GeoCycle savings: $1250k".to_string(),
            ]
        );
    }

    #[test]
    fn test_numeric_selector() {
        let config = DomainConfig::tyre_epr();
        let generator = SummaryGenerator::new(&config);
        let snapshot = final_snapshot(None, None, Some(ScenarioValue::Number(2.0)));
        let input = SummaryInput {
            behavior: BehaviorType::Explorer,
            confidence: 80,
            exploration_range: 0.0,
            final_snapshot: Some(&snapshot),
        };
        assert_eq!(
            generator.generate(&input),
            "Explorer approach. high confidence in final scenario. settled on Year 2."
        );
    }

    #[test]
    fn test_range_threshold_is_strict() {
        let config = DomainConfig::tyre_epr();
        let generator = SummaryGenerator::new(&config);
        let mut input = SummaryInput {
            behavior: BehaviorType::Explorer,
            confidence: 10,
            exploration_range: 50_000.0,
            final_snapshot: None,
        };
        assert_eq!(generator.fragments(&input).len(), 2);

        input.exploration_range = 50_001.0;
        assert_eq!(generator.fragments(&input).len(), 3);
    }

    #[test]
    fn test_scale_tiers() {
        let config = DomainConfig::tyre_epr();
        let generator = SummaryGenerator::new(&config);
        let tier_for = |scale: f64| {
            let snapshot = final_snapshot(None, Some(scale), None);
            let input = SummaryInput {
                behavior: BehaviorType::Decided,
                confidence: 90,
                exploration_range: 0.0,
                final_snapshot: Some(&snapshot),
            };
            generator.fragments(&input)[2].clone()
        };

        assert_eq!(tier_for(13_500.0), "pilot phase focus");
        assert_eq!(tier_for(40_000.0), "growth phase target");
        assert_eq!(tier_for(99_999.0), "growth phase target");
        assert_eq!(tier_for(100_000.0), "targeting scale deployment (100k+ t)");
    }

    #[test]
    fn test_no_interaction_summary() {
        let config = DomainConfig::savings_calculator();
        let generator = SummaryGenerator::new(&config);
        let input = SummaryInput {
            behavior: BehaviorType::NoInteraction,
            confidence: 0,
            exploration_range: 0.0,
            final_snapshot: None,
        };
        assert_eq!(generator.generate(&input), "User did not interact with the calculator");
    }

    #[test]
    fn test_deterministic() {
        let config = DomainConfig::tyre_epr();
        let generator = SummaryGenerator::new(&config);
        let snapshot = final_snapshot(Some(42_000.0), Some(45_000.0), None);
        let input = SummaryInput {
            behavior: BehaviorType::Methodical,
            confidence: 67,
            exploration_range: 75_000.0,
            final_snapshot: Some(&snapshot),
        };
        assert_eq!(generator.generate(&input), generator.generate(&input));
    }
}
