//! Session sheet column layout
//!
//! One row per session: identifiers and activity counters, the final
//! configuration's field values, then the behavioral profile.

use crate::analysis::round_half_up;
use crate::config::{DomainConfig, FinalColumn};
use crate::types::{
    format_number, optional_label, BehaviorProfile, ConfigurationSnapshot, FieldSection,
    NormalizedSession, ScenarioValue, SessionPayload,
};
use chrono::{DateTime, SecondsFormat, Utc};

/// Leading columns shared by every domain
pub const LEADING_HEADERS: [&str; 5] = [
    "Timestamp",
    "User ID",
    "Session ID",
    "Duration (min)",
    "Nb Changes",
];

/// A single cell of the session sheet
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    /// Text as written to the store
    pub fn render(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Number(n) => format_number(*n),
        }
    }
}

impl From<&ScenarioValue> for Cell {
    fn from(value: &ScenarioValue) -> Self {
        match value {
            ScenarioValue::Number(n) => Cell::Number(*n),
            ScenarioValue::Text(t) => Cell::Text(t.clone()),
        }
    }
}

/// Fixed column layout of one domain's session sheet
#[derive(Debug, Clone)]
pub struct SessionLayout {
    final_columns: Vec<FinalColumn>,
    headers: Vec<String>,
    with_intensity: bool,
    with_awareness: bool,
}

impl SessionLayout {
    pub fn new(config: &DomainConfig) -> Self {
        let columns = &config.columns;

        let mut headers: Vec<String> = LEADING_HEADERS.iter().map(|h| h.to_string()).collect();
        headers.extend(columns.final_config.iter().map(|c| c.header.clone()));
        headers.push("Confidence (%)".to_string());
        headers.push("Behavior Type".to_string());
        headers.push(columns.exploration_range.clone());
        headers.push(columns.exploration_average.clone());
        headers.push("Time on Final Config (s)".to_string());
        headers.push(columns.scale_trend.clone());
        headers.push(columns.outcome_trend.clone());
        headers.extend(columns.exploration_intensity.iter().cloned());
        headers.extend(columns.risk_awareness.iter().cloned());
        headers.push("Analysis Summary".to_string());

        Self {
            final_columns: columns.final_config.clone(),
            headers,
            with_intensity: columns.exploration_intensity.is_some(),
            with_awareness: columns.risk_awareness.is_some(),
        }
    }

    /// Header row
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Build the row for one analysed session
    pub fn row(
        &self,
        timestamp: DateTime<Utc>,
        payload: &SessionPayload,
        session: &NormalizedSession,
        profile: &BehaviorProfile,
    ) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(self.headers.len());

        cells.push(Cell::Text(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)));
        cells.push(Cell::Text(session.user_id.clone()));
        cells.push(Cell::Text(session.session_id.clone()));
        cells.push(Cell::Number(session_minutes(session.total_session_seconds)));
        cells.push(Cell::Number(session.total_changes as f64));

        // An untouched calculator reports the defaults, whatever finalConfig says
        let final_config = if session.history.is_empty() {
            None
        } else {
            payload.final_config.as_ref()
        };
        cells.extend(
            self.final_columns
                .iter()
                .map(|column| final_cell(final_config, column)),
        );

        cells.push(Cell::Number(profile.confidence as f64));
        cells.push(Cell::Text(profile.behavior_type.label().to_string()));
        cells.push(Cell::Number(profile.exploration_range));
        cells.push(Cell::Number(profile.exploration_average));
        cells.push(Cell::Number(profile.time_on_final_config as f64));
        cells.push(Cell::Text(profile.scale_trend.label().to_string()));
        cells.push(Cell::Text(profile.outcome_trend.label().to_string()));
        if self.with_intensity {
            let label = profile.exploration_intensity.map(|i| i.label());
            cells.push(Cell::Text(optional_label(label).to_string()));
        }
        if self.with_awareness {
            let label = profile.risk_awareness.map(|r| r.label());
            cells.push(Cell::Text(optional_label(label).to_string()));
        }
        cells.push(Cell::Text(profile.summary.clone()));

        cells
    }
}

/// Session duration in minutes with one decimal
pub fn session_minutes(total_session_seconds: f64) -> f64 {
    round_half_up(total_session_seconds / 60.0 * 10.0) / 10.0
}

fn final_cell(final_config: Option<&ConfigurationSnapshot>, column: &FinalColumn) -> Cell {
    final_config
        .and_then(|snapshot| reported_value(snapshot, column))
        .unwrap_or_else(|| Cell::from(&column.default))
}

/// Value the snapshot reports for a column, treating zero and blank as unset
fn reported_value(snapshot: &ConfigurationSnapshot, column: &FinalColumn) -> Option<Cell> {
    match column.source.section {
        FieldSection::Scenario => match snapshot.selector(&column.source)? {
            ScenarioValue::Text(text) if !text.trim().is_empty() => Some(Cell::Text(text)),
            ScenarioValue::Number(n) if n != 0.0 => Some(Cell::Number(n)),
            _ => None,
        },
        FieldSection::Inputs | FieldSection::Results => snapshot
            .number(&column.source)
            .filter(|n| *n != 0.0)
            .map(Cell::Number),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{normalize, parse_payload};
    use crate::pipeline::compute_behavior_profile;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn render(cells: &[Cell]) -> Vec<String> {
        cells.iter().map(Cell::render).collect()
    }

    #[test]
    fn test_savings_headers() {
        let layout = SessionLayout::new(&DomainConfig::savings_calculator());
        let headers = layout.headers();
        assert_eq!(headers.len(), 26);
        assert_eq!(headers[0], "Timestamp");
        assert_eq!(headers[5], "Final Savings (£)");
        assert_eq!(headers[24], "Risk Appetite");
        assert_eq!(headers[25], "Analysis Summary");
    }

    #[test]
    fn test_tyre_headers() {
        let layout = SessionLayout::new(&DomainConfig::tyre_epr());
        let headers = layout.headers();
        assert_eq!(headers.len(), 31);
        assert_eq!(headers[5], "Selected Year");
        assert_eq!(headers[27], "Volume Trend");
        assert_eq!(headers[29], "Fee Exploration");
    }

    #[test]
    fn test_session_minutes() {
        assert_eq!(session_minutes(0.0), 0.0);
        assert_eq!(session_minutes(125.0), 2.1);
        assert_eq!(session_minutes(90.0), 1.5);
    }

    #[test]
    fn test_tyre_row_with_defaults() {
        let config = DomainConfig::tyre_epr();
        let layout = SessionLayout::new(&config);
        let payload = parse_payload(
            r#"{
                "sessionId": "sess-row",
                "userId": "user-row",
                "totalSessionSeconds": 125,
                "totalChanges": 3,
                "configHistory": [ { "durationMs": 30000, "scenario": { "year": "Year 2" } } ],
                "finalConfig": {
                    "durationMs": 30000,
                    "scenario": { "year": "Year 2" },
                    "inputs": { "garageFee": 50 },
                    "results": { "geocycleSavings": 0 }
                }
            }"#,
        )
        .unwrap();
        let session = normalize(&payload, &config).unwrap();
        let profile = compute_behavior_profile(&session, &config);
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();

        let row = render(&layout.row(timestamp, &payload, &session, &profile));

        assert_eq!(row.len(), layout.headers().len());
        assert_eq!(
            row[..22].to_vec(),
            vec![
                "2024-03-01T09:30:00.000Z", "user-row", "sess-row", "2.1", "3",
                "Year 2", "3", "13500", "450000", "120", "25",
                "50", "12", "30", "17", "15",
                "0", "119", "0", "40", "0", "0",
            ]
        );
        assert_eq!(row[22], "100");
        assert_eq!(row[23], "Decided");
        assert_eq!(row[29], "Focused");
    }

    #[test]
    fn test_empty_history_row_uses_defaults() {
        let config = DomainConfig::savings_calculator();
        let layout = SessionLayout::new(&config);
        let payload = parse_payload(
            r#"{ "sessionId": "s", "userId": "u", "finalConfig": { "results": { "totalAnnualSavings": 99000 } } }"#,
        )
        .unwrap();
        let session = normalize(&payload, &config).unwrap();
        let profile = compute_behavior_profile(&session, &config);

        let row = render(&layout.row(Utc::now(), &payload, &session, &profile));
        assert_eq!(row[5], "0");
        assert_eq!(row[17], "0");
        assert_eq!(row[18], "No interaction");
        assert_eq!(row[22], "N/A");
        assert_eq!(row[24], "N/A");
        assert_eq!(row[25], "User did not interact with the calculator");
    }
}
