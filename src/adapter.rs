//! Session payload adapter
//!
//! Parses the calculator's session JSON and resolves every tracked dimension
//! to a concrete value once, so the analytics never deal with absent fields.

use crate::config::DomainConfig;
use crate::error::InsightError;
use crate::types::{ConfigurationSnapshot, NormalizedSession, ResolvedSnapshot, SessionPayload};
use tracing::warn;
use uuid::Uuid;

/// User identifier recorded when the client does not send one
pub const ANONYMOUS_USER: &str = "anonymous";

/// Parse a session JSON string into a SessionPayload
pub fn parse_payload(json: &str) -> Result<SessionPayload, InsightError> {
    serde_json::from_str(json)
        .map_err(|e| InsightError::ParseError(e.to_string()))
}

/// Resolve a payload against a domain configuration
pub fn normalize(
    payload: &SessionPayload,
    config: &DomainConfig,
) -> Result<NormalizedSession, InsightError> {
    if !payload.total_session_seconds.is_finite() || payload.total_session_seconds < 0.0 {
        return Err(InsightError::InvalidPayload(format!(
            "totalSessionSeconds must be a non-negative number, got {}",
            payload.total_session_seconds
        )));
    }

    let session_id = match non_blank(payload.session_id.as_deref()) {
        Some(id) => id.to_string(),
        None => {
            let generated = Uuid::new_v4().to_string();
            warn!(session_id = %generated, "payload has no sessionId, generated one");
            generated
        }
    };

    let user_id = non_blank(payload.user_id.as_deref())
        .unwrap_or(ANONYMOUS_USER)
        .to_string();

    let history = payload
        .config_history
        .iter()
        .map(|snapshot| resolve_snapshot(snapshot, config))
        .collect();

    let final_snapshot = payload
        .final_config
        .as_ref()
        .map(|snapshot| resolve_snapshot(snapshot, config));

    Ok(NormalizedSession {
        session_id,
        user_id,
        total_session_seconds: payload.total_session_seconds,
        total_changes: payload.total_changes,
        history,
        final_snapshot,
    })
}

/// Resolve one snapshot's tracked dimensions
pub fn resolve_snapshot(snapshot: &ConfigurationSnapshot, config: &DomainConfig) -> ResolvedSnapshot {
    ResolvedSnapshot {
        duration_ms: snapshot.duration_ms,
        outcome: config.outcome.resolve(snapshot),
        scale: config.scale.resolve(snapshot),
        spread: config.spread.as_ref().map(|spec| spec.resolve(snapshot)),
        risk: config.risk.as_ref().map(|spec| spec.resolve(snapshot)),
        reported_outcome: config.outcome.reported(snapshot),
        reported_scale: config.scale.reported(snapshot),
        selector: config
            .selector
            .as_ref()
            .and_then(|path| snapshot.selector(path))
            .filter(|value| !value.to_string().trim().is_empty()),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScenarioValue;

    fn tyre_payload_json() -> &'static str {
        r#"{
            "sessionId": "sess-tyre-1",
            "userId": "user-42",
            "totalSessionSeconds": 312,
            "totalChanges": 7,
            "configHistory": [
                {
                    "durationMs": 20000,
                    "scenario": { "year": "Year 1", "volume": 13500 },
                    "results": { "totalEcoFee": 1600000, "geocycleSavings": 300000 }
                },
                {
                    "durationMs": 45000,
                    "inputs": { "volume": 40000 },
                    "results": { "totalEcoFee": 4800000 }
                }
            ],
            "finalConfig": {
                "durationMs": 45000,
                "inputs": { "volume": 40000 },
                "results": { "totalEcoFee": 4800000 }
            }
        }"#
    }

    #[test]
    fn test_parse_payload_json() {
        let payload = parse_payload(tyre_payload_json()).unwrap();
        assert_eq!(payload.session_id.as_deref(), Some("sess-tyre-1"));
        assert_eq!(payload.config_history.len(), 2);
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_payload("{ not json");
        assert!(matches!(result, Err(InsightError::ParseError(_))));
    }

    #[test]
    fn test_normalize_resolves_dimensions() {
        let config = DomainConfig::tyre_epr();
        let payload = parse_payload(tyre_payload_json()).unwrap();
        let session = normalize(&payload, &config).unwrap();

        assert_eq!(session.session_id, "sess-tyre-1");
        assert_eq!(session.user_id, "user-42");
        assert_eq!(session.config_count(), 2);

        let first = &session.history[0];
        assert_eq!(first.scale, 13_500.0);
        assert_eq!(first.outcome, 300_000.0);
        assert_eq!(first.spread, Some(1_600_000.0));
        assert_eq!(first.risk, None);
        assert_eq!(first.selector, Some(ScenarioValue::Text("Year 1".to_string())));

        let second = &session.history[1];
        assert_eq!(second.scale, 40_000.0);
        assert_eq!(second.outcome, 0.0);
        assert_eq!(second.reported_outcome, None);
        assert_eq!(second.selector, None);

        let final_snapshot = session.final_snapshot.unwrap();
        assert_eq!(final_snapshot.duration_ms, 45_000);
        assert_eq!(final_snapshot.reported_scale, Some(40_000.0));
    }

    #[test]
    fn test_missing_identifiers() {
        let config = DomainConfig::savings_calculator();
        let payload = parse_payload(r#"{ "userId": "  " }"#).unwrap();
        let session = normalize(&payload, &config).unwrap();

        assert_eq!(session.user_id, ANONYMOUS_USER);
        assert!(Uuid::parse_str(&session.session_id).is_ok());
        assert!(session.history.is_empty());
        assert!(session.final_snapshot.is_none());
    }

    #[test]
    fn test_untracked_fields_do_not_reject_payload() {
        let config = DomainConfig::savings_calculator();
        let payload = parse_payload(
            r#"{
                "sessionId": "s-mixed",
                "configHistory": [
                    {
                        "durationMs": 1000,
                        "inputs": { "monthlyTonnage": 2500, "currency": "GBP", "includeIncidents": true },
                        "results": { "totalAnnualSavings": "n/a" }
                    }
                ]
            }"#,
        )
        .unwrap();
        let session = normalize(&payload, &config).unwrap();

        assert_eq!(session.history[0].scale, 2_500.0);
        assert_eq!(session.history[0].outcome, 0.0);
        assert_eq!(session.history[0].reported_outcome, None);
    }

    #[test]
    fn test_negative_session_seconds_rejected() {
        let config = DomainConfig::savings_calculator();
        let payload = parse_payload(r#"{ "totalSessionSeconds": -1 }"#).unwrap();
        let result = normalize(&payload, &config);
        assert!(matches!(result, Err(InsightError::InvalidPayload(_))));
    }

    #[test]
    fn test_absent_outcome_is_not_reported() {
        let config = DomainConfig::savings_calculator();
        let snapshot = ConfigurationSnapshot::default();
        let resolved = resolve_snapshot(&snapshot, &config);
        assert_eq!(resolved.outcome, 0.0);
        assert_eq!(resolved.reported_outcome, None);
        assert_eq!(resolved.risk, Some(0.0));
        assert_eq!(resolved.spread, None);
    }
}
