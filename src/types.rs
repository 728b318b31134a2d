//! Session and profile data types
//!
//! This module defines the payload submitted by the calculator front-end, the
//! fully-resolved internal record the analytics engine works on, and the
//! behavioral profile it produces.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Treat an explicit JSON `null` the same as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A discrete scenario selector (target year, market-share tier, volume preset)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioValue {
    Number(f64),
    Text(String),
}

impl ScenarioValue {
    /// Selector from a raw JSON value; only numbers and strings qualify
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(ScenarioValue::Number),
            Value::String(s) => Some(ScenarioValue::Text(s.clone())),
            _ => None,
        }
    }

    /// Numeric view of the selector, if it is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ScenarioValue::Number(n) => Some(*n),
            ScenarioValue::Text(_) => None,
        }
    }
}

impl fmt::Display for ScenarioValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioValue::Number(n) => write!(f, "{}", format_number(*n)),
            ScenarioValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Render a number without a trailing `.0` when it is integral
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Section of a snapshot a field lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSection {
    Inputs,
    Results,
    Scenario,
}

/// Address of a named field inside a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPath {
    pub section: FieldSection,
    pub name: String,
}

impl FieldPath {
    pub fn inputs(name: &str) -> Self {
        Self {
            section: FieldSection::Inputs,
            name: name.to_string(),
        }
    }

    pub fn results(name: &str) -> Self {
        Self {
            section: FieldSection::Results,
            name: name.to_string(),
        }
    }

    pub fn scenario(name: &str) -> Self {
        Self {
            section: FieldSection::Scenario,
            name: name.to_string(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let section = match self.section {
            FieldSection::Inputs => "inputs",
            FieldSection::Results => "results",
            FieldSection::Scenario => "scenario",
        };
        write!(f, "{section}.{}", self.name)
    }
}

/// One configuration the user evaluated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationSnapshot {
    /// Time spent with this configuration active
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration_ms: u64,
    /// Calculator inputs (tonnage, fee rates, hourly rate, ...)
    #[serde(default, deserialize_with = "null_as_default")]
    pub inputs: BTreeMap<String, Value>,
    /// Values derived from the inputs (savings, revenue, ...)
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: BTreeMap<String, Value>,
    /// Discrete selectors such as target year or market share
    #[serde(default, deserialize_with = "null_as_default")]
    pub scenario: BTreeMap<String, Value>,
}

impl ConfigurationSnapshot {
    /// Look up a numeric field, `None` when absent, null or non-numeric.
    ///
    /// Sections are kept as raw JSON; fields that are not tracked, or not of the
    /// expected type, are ignored rather than failing the whole payload.
    pub fn number(&self, path: &FieldPath) -> Option<f64> {
        self.section(path.section)
            .get(&path.name)
            .and_then(Value::as_f64)
    }

    /// Look up a scenario field as a displayable selector value
    pub fn selector(&self, path: &FieldPath) -> Option<ScenarioValue> {
        match path.section {
            FieldSection::Scenario => self.scenario.get(&path.name).and_then(ScenarioValue::from_json),
            _ => None,
        }
    }

    fn section(&self, section: FieldSection) -> &BTreeMap<String, Value> {
        match section {
            FieldSection::Inputs => &self.inputs,
            FieldSection::Results => &self.results,
            FieldSection::Scenario => &self.scenario,
        }
    }
}

/// The full interaction record submitted once per session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_session_seconds: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_changes: u64,
    /// Chronological list of configurations the user tried
    #[serde(default, deserialize_with = "null_as_default")]
    pub config_history: Vec<ConfigurationSnapshot>,
    /// The configuration the user settled on
    #[serde(default)]
    pub final_config: Option<ConfigurationSnapshot>,
}

/// A snapshot with every tracked dimension resolved to a concrete value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSnapshot {
    pub duration_ms: u64,
    /// Primary outcome dimension (savings, GeoCycle savings)
    pub outcome: f64,
    /// Primary scale dimension (tonnage, volume)
    pub scale: f64,
    /// Spread dimension used for variance-based exploration intensity
    pub spread: Option<f64>,
    /// Risk dimension used for the awareness bucket
    pub risk: Option<f64>,
    /// Outcome as reported by the client, only when present and non-zero
    pub reported_outcome: Option<f64>,
    /// Scale as reported by the client, only when present and non-zero
    pub reported_scale: Option<f64>,
    /// Scenario selector carried by the snapshot
    pub selector: Option<ScenarioValue>,
}

/// Session record after payload normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedSession {
    pub session_id: String,
    pub user_id: String,
    pub total_session_seconds: f64,
    pub total_changes: u64,
    pub history: Vec<ResolvedSnapshot>,
    pub final_snapshot: Option<ResolvedSnapshot>,
}

impl NormalizedSession {
    /// Number of configurations the user explored
    pub fn config_count(&self) -> usize {
        self.history.len()
    }
}

/// Discrete behavior label derived from interaction volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorType {
    NoInteraction,
    Decided,
    Methodical,
    Explorer,
    DeepExplorer,
}

impl BehaviorType {
    pub fn label(&self) -> &'static str {
        match self {
            BehaviorType::NoInteraction => "No interaction",
            BehaviorType::Decided => "Decided",
            BehaviorType::Methodical => "Methodical",
            BehaviorType::Explorer => "Explorer",
            BehaviorType::DeepExplorer => "Deep Explorer",
        }
    }
}

/// Direction of a numeric sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Stable,
    Increasing,
    Decreasing,
    NotApplicable,
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Trend::Stable => "Stable",
            Trend::Increasing => "Increasing",
            Trend::Decreasing => "Decreasing",
            Trend::NotApplicable => "N/A",
        }
    }
}

/// Variance-derived exploration intensity over the spread dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplorationIntensity {
    WideExploration,
    ModerateExploration,
    Focused,
}

impl ExplorationIntensity {
    pub fn label(&self) -> &'static str {
        match self {
            ExplorationIntensity::WideExploration => "Wide exploration",
            ExplorationIntensity::ModerateExploration => "Moderate exploration",
            ExplorationIntensity::Focused => "Focused",
        }
    }
}

/// Bucket of the average risk-relevant value the user explored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskAwareness {
    HighAwareness,
    ModerateAwareness,
    Conservative,
}

impl RiskAwareness {
    pub fn label(&self) -> &'static str {
        match self {
            RiskAwareness::HighAwareness => "High awareness",
            RiskAwareness::ModerateAwareness => "Moderate awareness",
            RiskAwareness::Conservative => "Conservative",
        }
    }
}

/// Label for an optional classification, "N/A" when it was not computed
pub fn optional_label(label: Option<&'static str>) -> &'static str {
    label.unwrap_or("N/A")
}

/// Behavioral profile computed for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorProfile {
    /// How settled the user was on the final configuration (0-100)
    pub confidence: u8,
    pub behavior_type: BehaviorType,
    /// max - min over the exploration dimension
    pub exploration_range: f64,
    /// Mean of the exploration dimension, rounded to a whole unit
    pub exploration_average: f64,
    /// Seconds spent on the final configuration
    pub time_on_final_config: u64,
    pub scale_trend: Trend,
    pub outcome_trend: Trend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exploration_intensity: Option<ExplorationIntensity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_awareness: Option<RiskAwareness>,
    pub summary: String,
}
