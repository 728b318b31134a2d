//! Session analysis pipeline
//!
//! This module provides the public API for behavioral profiling. It wires the
//! payload adapter to the analytics components and assembles the profile.

use crate::adapter::{normalize, parse_payload};
use crate::analysis::exploration::{classify_awareness, classify_variance, variance, ExplorationStats};
use crate::analysis::summary::{SummaryGenerator, SummaryInput};
use crate::analysis::{analyze_trend, classify_behavior, mean, round_half_up, score_confidence};
use crate::config::{Dimension, DomainConfig};
use crate::error::InsightError;
use crate::types::{BehaviorProfile, BehaviorType, NormalizedSession, SessionPayload, Trend};
use tracing::debug;

/// Compute the behavioral profile of a normalized session.
///
/// Total over every session, including one with an empty history, which yields
/// the fixed no-interaction profile.
pub fn compute_behavior_profile(session: &NormalizedSession, config: &DomainConfig) -> BehaviorProfile {
    if session.history.is_empty() {
        return no_interaction_profile(config);
    }

    let history = &session.history;
    let final_snapshot = session.final_snapshot.as_ref();

    let outcomes: Vec<f64> = history.iter().map(|s| s.outcome).collect();
    let scales: Vec<f64> = history.iter().map(|s| s.scale).collect();

    let explored = match config.exploration_dimension {
        Dimension::Outcome => &outcomes,
        Dimension::Scale => &scales,
    };
    let stats = ExplorationStats::from_values(explored);

    let confidence = score_confidence(history, final_snapshot);
    let behavior_type = classify_behavior(history.len());

    let exploration_intensity = config.spread.as_ref().map(|_| {
        let spreads: Vec<f64> = history.iter().filter_map(|s| s.spread).collect();
        classify_variance(variance(&spreads))
    });

    let risk_awareness = config.risk.as_ref().map(|_| {
        let risks: Vec<f64> = history.iter().filter_map(|s| s.risk).collect();
        classify_awareness(mean(&risks).unwrap_or(0.0))
    });

    let summary = SummaryGenerator::new(config).generate(&SummaryInput {
        behavior: behavior_type,
        confidence,
        exploration_range: stats.range,
        final_snapshot,
    });

    let final_ms = final_snapshot.map(|s| s.duration_ms).unwrap_or(0);

    BehaviorProfile {
        confidence,
        behavior_type,
        exploration_range: stats.range,
        exploration_average: round_half_up(stats.average),
        time_on_final_config: round_half_up(final_ms as f64 / 1000.0) as u64,
        scale_trend: analyze_trend(&scales),
        outcome_trend: analyze_trend(&outcomes),
        exploration_intensity,
        risk_awareness,
        summary,
    }
}

/// Fixed profile for a session in which the user explored nothing
pub fn no_interaction_profile(config: &DomainConfig) -> BehaviorProfile {
    BehaviorProfile {
        confidence: 0,
        behavior_type: BehaviorType::NoInteraction,
        exploration_range: 0.0,
        exploration_average: 0.0,
        time_on_final_config: 0,
        scale_trend: Trend::NotApplicable,
        outcome_trend: Trend::NotApplicable,
        exploration_intensity: None,
        risk_awareness: None,
        summary: config.phrases.no_interaction.clone(),
    }
}

/// Convert session JSON into a behavioral profile (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let profile = analyze_session_json(json, &DomainConfig::tyre_epr())?;
/// ```
pub fn analyze_session_json(json: &str, config: &DomainConfig) -> Result<BehaviorProfile, InsightError> {
    // Stage 1: Parse payload JSON
    let payload = parse_payload(json)?;

    // Stage 2: Resolve defaults
    let session = normalize(&payload, config)?;

    // Stage 3: Analyse
    Ok(compute_behavior_profile(&session, config))
}

/// Stateful processor bound to one domain configuration.
///
/// Keeps a count of analysed sessions; the analysis itself is stateless.
pub struct SessionAnalyzer {
    config: DomainConfig,
    sessions_processed: usize,
}

impl Default for SessionAnalyzer {
    fn default() -> Self {
        Self::new(DomainConfig::default())
    }
}

impl SessionAnalyzer {
    /// Create an analyzer for a domain configuration
    pub fn new(config: DomainConfig) -> Self {
        Self {
            config,
            sessions_processed: 0,
        }
    }

    /// Create an analyzer for a built-in domain preset
    pub fn for_domain(name: &str) -> Result<Self, InsightError> {
        Ok(Self::new(DomainConfig::preset(name)?))
    }

    pub fn config(&self) -> &DomainConfig {
        &self.config
    }

    /// Analyse an already parsed payload
    pub fn analyze(
        &mut self,
        payload: &SessionPayload,
    ) -> Result<(NormalizedSession, BehaviorProfile), InsightError> {
        let session = normalize(payload, &self.config)?;
        let profile = compute_behavior_profile(&session, &self.config);
        self.sessions_processed += 1;

        debug!(
            session_id = %session.session_id,
            behavior = profile.behavior_type.label(),
            confidence = profile.confidence,
            "computed behavior profile"
        );

        Ok((session, profile))
    }

    /// Parse and analyse session JSON
    pub fn process(&mut self, json: &str) -> Result<BehaviorProfile, InsightError> {
        let payload = parse_payload(json)?;
        let (_, profile) = self.analyze(&payload)?;
        Ok(profile)
    }

    /// Number of sessions analysed so far
    pub fn session_count(&self) -> usize {
        self.sessions_processed
    }
}
