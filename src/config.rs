//! Domain configuration
//!
//! Every calculator variant is described by one `DomainConfig`: which named
//! fields feed the outcome/scale/spread/risk dimensions, the default each field
//! resolves to when the client omits it, the domain-calibrated thresholds, the
//! summary phrasing and the session sheet column layout.
//!
//! Two presets ship with the crate: the general savings calculator and the
//! tyre EPR calculator. Other variants can be loaded from JSON.

use crate::error::InsightError;
use crate::types::{ConfigurationSnapshot, FieldPath, ScenarioValue};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Names accepted by [`DomainConfig::preset`]
pub const PRESET_NAMES: &[&str] = &["savings", "tyre-epr"];

/// A numeric dimension resolved from an ordered list of candidate fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Candidate fields, first reported value wins
    pub sources: Vec<FieldPath>,
    /// Value used when no candidate reports a value
    #[serde(default)]
    pub default: f64,
}

impl FieldSpec {
    pub fn new(sources: Vec<FieldPath>, default: f64) -> Self {
        Self { sources, default }
    }

    /// First value the snapshot reports for this dimension.
    ///
    /// A field reports a value when it is present and non-zero; zero is treated
    /// like an unset calculator field.
    pub fn reported(&self, snapshot: &ConfigurationSnapshot) -> Option<f64> {
        self.sources
            .iter()
            .filter_map(|path| snapshot.number(path))
            .find(|v| *v != 0.0 && !v.is_nan())
    }

    /// Reported value, or the configured default
    pub fn resolve(&self, snapshot: &ConfigurationSnapshot) -> f64 {
        self.reported(snapshot).unwrap_or(self.default)
    }
}

/// Which dimension the exploration range/average is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Outcome,
    Scale,
}

/// Two cut points splitting the scale dimension into three ordered tiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleTiers {
    /// Values at or above this are at least the middle tier
    pub low_cut: f64,
    /// Values at or above this are the top tier
    pub high_cut: f64,
}

/// Text placed around a number rendered in thousands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affix {
    pub prefix: String,
    pub suffix: String,
}

impl Affix {
    pub fn new(prefix: &str, suffix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }

    pub fn wrap(&self, value: impl std::fmt::Display) -> String {
        format!("{}{}{}", self.prefix, value, self.suffix)
    }
}

/// Domain phrasing used by the summary generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryPhrases {
    pub decided: String,
    pub deep_explorer: String,
    pub high_confidence: String,
    pub moderate_confidence: String,
    pub low_confidence: String,
    pub wide_range: Affix,
    /// Prefix for the final scenario selector
    pub selector: String,
    /// Prefix placed before numeric selectors (e.g. "Year ")
    pub numeric_selector: String,
    /// Small, medium and large scale phrases, in that order
    pub scale_tiers: [String; 3],
    pub outcome: Affix,
    /// Summary used when the user never touched the calculator
    pub no_interaction: String,
}

/// One final-configuration column of the session sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalColumn {
    pub header: String,
    pub source: FieldPath,
    pub default: ScenarioValue,
}

impl FinalColumn {
    fn number(header: &str, source: FieldPath, default: f64) -> Self {
        Self {
            header: header.to_string(),
            source,
            default: ScenarioValue::Number(default),
        }
    }
}

/// Domain-specific parts of the session sheet layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub final_config: Vec<FinalColumn>,
    pub exploration_range: String,
    pub exploration_average: String,
    pub scale_trend: String,
    pub outcome_trend: String,
    #[serde(default)]
    pub exploration_intensity: Option<String>,
    #[serde(default)]
    pub risk_awareness: Option<String>,
}

/// Complete description of one calculator variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Short identifier ("savings", "tyre-epr")
    pub name: String,
    /// Human-readable tracker title
    pub title: String,
    /// Plain-text health check response; the title is used when empty
    #[serde(default)]
    pub banner: String,
    /// Primary outcome dimension, trended and reported in the summary
    pub outcome: FieldSpec,
    /// Primary scale dimension, trended and bucketed into tiers
    pub scale: FieldSpec,
    /// Dimension whose variance drives the exploration intensity
    #[serde(default)]
    pub spread: Option<FieldSpec>,
    /// Dimension whose average drives the risk awareness bucket
    #[serde(default)]
    pub risk: Option<FieldSpec>,
    /// Scenario selector reported in the summary (e.g. target year)
    #[serde(default)]
    pub selector: Option<FieldPath>,
    pub exploration_dimension: Dimension,
    /// Ranges strictly above this earn the wide-range summary fragment
    pub exploration_range_threshold: f64,
    pub scale_tiers: ScaleTiers,
    pub phrases: SummaryPhrases,
    pub columns: ColumnLayout,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self::savings_calculator()
    }
}

impl DomainConfig {
    /// Look up a built-in preset by name
    pub fn preset(name: &str) -> Result<Self, InsightError> {
        match name {
            "savings" => Ok(Self::savings_calculator()),
            "tyre-epr" => Ok(Self::tyre_epr()),
            other => Err(InsightError::ConfigError(format!(
                "unknown domain '{}', expected one of: {}",
                other,
                PRESET_NAMES.join(", ")
            ))),
        }
    }

    /// General PRN/savings calculator
    pub fn savings_calculator() -> Self {
        let savings = FieldPath::results("totalAnnualSavings");
        let tonnage = FieldPath::inputs("monthlyTonnage");
        let incident_cost = FieldPath::inputs("avgIncidentCost");

        Self {
            name: "savings".to_string(),
            title: "AMCore Tracker".to_string(),
            banner: "AMCore Tracker - Intelligent Session Analysis".to_string(),
            outcome: FieldSpec::new(vec![savings.clone()], 0.0),
            scale: FieldSpec::new(vec![tonnage.clone()], 0.0),
            spread: None,
            risk: Some(FieldSpec::new(vec![incident_cost.clone()], 0.0)),
            selector: None,
            exploration_dimension: Dimension::Outcome,
            exploration_range_threshold: 100_000.0,
            scale_tiers: ScaleTiers {
                low_cut: 2_000.0,
                high_cut: 4_000.0,
            },
            phrases: SummaryPhrases {
                decided: "Quick decision maker - knew their numbers".to_string(),
                deep_explorer: "Thoroughly explored options".to_string(),
                high_confidence: "high confidence in final config".to_string(),
                moderate_confidence: "moderate confidence".to_string(),
                low_confidence: "still exploring".to_string(),
                wide_range: Affix::new("wide savings range explored (£", "k)"),
                selector: "settled on ".to_string(),
                numeric_selector: "Year ".to_string(),
                scale_tiers: [
                    "smaller operation".to_string(),
                    "medium operation".to_string(),
                    "large operation".to_string(),
                ],
                outcome: Affix::new("settled on £", "k savings"),
                no_interaction: "User did not interact with the calculator".to_string(),
            },
            columns: ColumnLayout {
                final_config: vec![
                    FinalColumn::number("Final Savings (£)", savings, 0.0),
                    FinalColumn::number("Final Hours Saved", FieldPath::results("prnHoursSaved"), 0.0),
                    FinalColumn::number("Final PRN Recovered (£)", FieldPath::results("prnRecovered"), 0.0),
                    FinalColumn::number("Final PRN Hrs/Week", FieldPath::inputs("prnHoursPerWeek"), 0.0),
                    FinalColumn::number("Final Hourly Rate (£)", FieldPath::inputs("prnHourlyRate"), 0.0),
                    FinalColumn::number("Final Missed PRN (%)", FieldPath::inputs("missedPrnRate"), 0.0),
                    FinalColumn::number("Final Tonnage (t)", tonnage, 0.0),
                    FinalColumn::number("Final PRN Value (£)", FieldPath::inputs("prnValuePerTonne"), 0.0),
                    FinalColumn::number("Final Automation (%)", FieldPath::inputs("automationReduction"), 0.0),
                    FinalColumn::number(
                        "Final Incidents/Year",
                        FieldPath::inputs("contaminationIncidentsPerYear"),
                        0.0,
                    ),
                    FinalColumn::number("Final Incident Cost (£)", incident_cost, 0.0),
                    FinalColumn::number(
                        "Final Incident Reduction (%)",
                        FieldPath::inputs("incidentReduction"),
                        0.0,
                    ),
                ],
                exploration_range: "Exploration Range (£)".to_string(),
                exploration_average: "Avg Savings Explored (£)".to_string(),
                scale_trend: "Tonnage Trend".to_string(),
                outcome_trend: "Price Trend".to_string(),
                exploration_intensity: None,
                risk_awareness: Some("Risk Appetite".to_string()),
            },
        }
    }

    /// Tyre EPR calculator (eco2Veritas x GeoCycle, Mexico market)
    pub fn tyre_epr() -> Self {
        let volume = FieldPath::scenario("volume");
        let eco_fee = FieldPath::results("totalEcoFee");
        let geocycle_savings = FieldPath::results("geocycleSavings");

        Self {
            name: "tyre-epr".to_string(),
            title: "Tyre EPR Tracker - eco2Veritas x GeoCycle".to_string(),
            banner: "Tyre EPR Tracker - eco2Veritas x GeoCycle Session Analysis".to_string(),
            outcome: FieldSpec::new(vec![geocycle_savings.clone()], 0.0),
            scale: FieldSpec::new(vec![volume.clone(), FieldPath::inputs("volume")], 13_500.0),
            spread: Some(FieldSpec::new(vec![eco_fee.clone()], 0.0)),
            risk: None,
            selector: Some(FieldPath::scenario("year")),
            exploration_dimension: Dimension::Scale,
            exploration_range_threshold: 50_000.0,
            scale_tiers: ScaleTiers {
                low_cut: 40_000.0,
                high_cut: 100_000.0,
            },
            phrases: SummaryPhrases {
                decided: "Quick decision maker - knew their scenario".to_string(),
                deep_explorer: "Thoroughly explored multi-year scenarios".to_string(),
                high_confidence: "high confidence in final scenario".to_string(),
                moderate_confidence: "moderate confidence".to_string(),
                low_confidence: "still exploring options".to_string(),
                wide_range: Affix::new("wide volume range explored (", "k tonnes)"),
                selector: "settled on ".to_string(),
                numeric_selector: "Year ".to_string(),
                scale_tiers: [
                    "pilot phase focus".to_string(),
                    "growth phase target".to_string(),
                    "targeting scale deployment (100k+ t)".to_string(),
                ],
                outcome: Affix::new("GeoCycle savings: $", "k"),
                no_interaction: "User did not interact with the calculator".to_string(),
            },
            columns: ColumnLayout {
                final_config: vec![
                    FinalColumn {
                        header: "Selected Year".to_string(),
                        source: FieldPath::scenario("year"),
                        default: ScenarioValue::Text("Year 1".to_string()),
                    },
                    FinalColumn::number("Market Share (%)", FieldPath::scenario("marketShare"), 3.0),
                    FinalColumn::number("Volume (tonnes)", volume, 13_500.0),
                    FinalColumn::number("Total Market (t)", FieldPath::inputs("totalMarket"), 450_000.0),
                    FinalColumn::number("Petcoke Price ($/t)", FieldPath::inputs("petcokePrice"), 120.0),
                    FinalColumn::number("TDF Discount (%)", FieldPath::inputs("tdfDiscount"), 25.0),
                    FinalColumn::number("Garage Fee ($/t)", FieldPath::inputs("garageFee"), 45.0),
                    FinalColumn::number("Collection Fee ($/t)", FieldPath::inputs("collectionFee"), 12.0),
                    FinalColumn::number("Transport Fee ($/t)", FieldPath::inputs("transportFee"), 30.0),
                    FinalColumn::number("Shredding Fee ($/t)", FieldPath::inputs("shreddingFee"), 17.0),
                    FinalColumn::number(
                        "Certification Fee ($/t)",
                        FieldPath::inputs("certificationFee"),
                        15.0,
                    ),
                    FinalColumn::number("Total Eco-Fee ($)", eco_fee, 0.0),
                    FinalColumn::number(
                        "Eco-Fee per Tonne ($/t)",
                        FieldPath::results("ecoFeePerTonne"),
                        119.0,
                    ),
                    FinalColumn::number("E2V Revenue ($)", FieldPath::results("e2vRevenue"), 0.0),
                    FinalColumn::number("E2V Margin (%)", FieldPath::results("e2vMargin"), 40.0),
                    FinalColumn::number("GeoCycle Savings ($)", geocycle_savings, 0.0),
                    FinalColumn::number("TDF Price ($/t)", FieldPath::results("tdfPrice"), 0.0),
                ],
                exploration_range: "Volume Range Explored (t)".to_string(),
                exploration_average: "Avg Volume Explored (t)".to_string(),
                scale_trend: "Volume Trend".to_string(),
                outcome_trend: "Price Trend".to_string(),
                exploration_intensity: Some("Fee Exploration".to_string()),
                risk_awareness: None,
            },
        }
    }

    /// Load a domain configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, InsightError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate a domain configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, InsightError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| InsightError::ConfigError(format!("Failed to parse domain config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON (useful as a template for custom domains)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check internal consistency of the configuration
    pub fn validate(&self) -> Result<(), InsightError> {
        if self.name.trim().is_empty() {
            return Err(InsightError::ConfigError("name must not be empty".to_string()));
        }
        if self.outcome.sources.is_empty() || self.scale.sources.is_empty() {
            return Err(InsightError::ConfigError(
                "outcome and scale dimensions need at least one source field".to_string(),
            ));
        }
        for spec in [&self.spread, &self.risk].into_iter().flatten() {
            if spec.sources.is_empty() {
                return Err(InsightError::ConfigError(
                    "spread and risk dimensions need at least one source field".to_string(),
                ));
            }
        }
        if self.exploration_range_threshold.is_nan() || self.exploration_range_threshold < 0.0 {
            return Err(InsightError::ConfigError(
                "exploration_range_threshold must be a non-negative number".to_string(),
            ));
        }
        if self.scale_tiers.low_cut > self.scale_tiers.high_cut {
            return Err(InsightError::ConfigError(format!(
                "scale tier cut points out of order: {} > {}",
                self.scale_tiers.low_cut, self.scale_tiers.high_cut
            )));
        }
        if self.spread.is_some() != self.columns.exploration_intensity.is_some() {
            return Err(InsightError::ConfigError(
                "spread dimension and exploration intensity column must be configured together"
                    .to_string(),
            ));
        }
        if self.risk.is_some() != self.columns.risk_awareness.is_some() {
            return Err(InsightError::ConfigError(
                "risk dimension and risk awareness column must be configured together".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    fn snapshot_with_scenario(volume: Option<f64>, input_volume: Option<f64>) -> ConfigurationSnapshot {
        let mut snapshot = ConfigurationSnapshot::default();
        if let Some(v) = volume {
            snapshot.scenario.insert("volume".to_string(), json!(v));
        }
        if let Some(v) = input_volume {
            snapshot.inputs.insert("volume".to_string(), json!(v));
        }
        snapshot
    }

    #[test]
    fn test_presets_validate() {
        for name in PRESET_NAMES {
            let config = DomainConfig::preset(name).unwrap();
            config.validate().unwrap();
            assert_eq!(&config.name, name);
        }
        assert!(DomainConfig::preset("unknown").is_err());
    }

    #[test]
    fn test_scale_fallback_chain() {
        let config = DomainConfig::tyre_epr();

        let scenario_first = snapshot_with_scenario(Some(40_000.0), Some(20_000.0));
        assert_eq!(config.scale.resolve(&scenario_first), 40_000.0);

        let inputs_only = snapshot_with_scenario(None, Some(20_000.0));
        assert_eq!(config.scale.resolve(&inputs_only), 20_000.0);

        let neither = snapshot_with_scenario(None, None);
        assert_eq!(config.scale.resolve(&neither), 13_500.0);
        assert_eq!(config.scale.reported(&neither), None);

        // Zero counts as unset and falls through the chain
        let zero = snapshot_with_scenario(Some(0.0), None);
        assert_eq!(config.scale.resolve(&zero), 13_500.0);
    }

    #[test]
    fn test_outcome_defaults_to_zero() {
        let config = DomainConfig::savings_calculator();
        let snapshot = ConfigurationSnapshot {
            results: BTreeMap::from([("totalAnnualSavings".to_string(), Value::Null)]),
            ..Default::default()
        };
        assert_eq!(config.outcome.resolve(&snapshot), 0.0);
    }

    #[test]
    fn test_json_roundtrip_of_preset() {
        let config = DomainConfig::tyre_epr();
        let json = config.to_json().unwrap();
        let parsed = DomainConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validate_rejects_unordered_tiers() {
        let mut config = DomainConfig::savings_calculator();
        config.scale_tiers = ScaleTiers {
            low_cut: 5_000.0,
            high_cut: 1_000.0,
        };
        assert!(matches!(config.validate(), Err(InsightError::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_unpaired_spread_column() {
        let mut config = DomainConfig::savings_calculator();
        config.spread = Some(FieldSpec::new(vec![FieldPath::results("fee")], 0.0));
        assert!(config.validate().is_err());
    }
}
