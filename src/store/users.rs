//! Per-user rolling summary
//!
//! One record per user, updated in place after every recorded session.
//! First-seen is fixed when the record is created; last-seen, session count and
//! total time only move forward. The most likely configuration value is the
//! exploration-dimension value the user dwelt on longest, and is only replaced
//! by sessions whose longest dwell exceeds the threshold.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// Minimum dwell for a configuration to count as the user's likely choice
pub const MOST_LIKELY_MIN_DWELL_MS: u64 = 30_000;

/// Rolling summary of one user's sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub session_count: u64,
    /// Total session time in seconds
    pub total_time_sec: f64,
    /// Exploration-dimension value of the longest-dwell configuration
    pub most_likely_value: Option<f64>,
    /// Most recently applied session
    pub last_session_id: String,
    /// Every session already folded into this summary
    #[serde(default, with = "session_id_list")]
    pub session_ids: BTreeSet<String>,
}

impl UserSummary {
    /// Whether a session has already been applied to this summary
    pub fn has_session(&self, session_id: &str) -> bool {
        self.last_session_id == session_id || self.session_ids.contains(session_id)
    }
}

/// Session ids stored as one JSON array cell, so flat CSV rows can hold the set
mod session_id_list {
    use super::*;

    pub fn serialize<S: Serializer>(ids: &BTreeSet<String>, serializer: S) -> Result<S::Ok, S::Error> {
        let json = serde_json::to_string(ids).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&json)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeSet<String>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            return Ok(BTreeSet::new());
        }
        serde_json::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

/// What one recorded session contributes to its user's summary
#[derive(Debug, Clone, PartialEq)]
pub struct SessionVisit {
    pub user_id: String,
    pub session_id: String,
    pub seen_at: DateTime<Utc>,
    pub session_seconds: f64,
    /// Dwell (ms) and exploration value of the longest-dwell configuration
    pub longest_dwell: Option<(u64, f64)>,
}

/// Result of applying a visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    Created,
    Updated,
    /// The session was already applied to this user
    Unchanged,
}

/// In-memory collection of user summaries keyed by user id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSummaryBook {
    users: BTreeMap<String, UserSummary>,
}

impl UserSummaryBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from stored records; later duplicates win
    pub fn from_records(records: Vec<UserSummary>) -> Self {
        let users = records
            .into_iter()
            .map(|summary| (summary.user_id.clone(), summary))
            .collect();
        Self { users }
    }

    /// Records in user id order
    pub fn records(&self) -> Vec<UserSummary> {
        self.users.values().cloned().collect()
    }

    pub fn get(&self, user_id: &str) -> Option<&UserSummary> {
        self.users.get(user_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Fold a session into its user's summary
    pub fn apply(&mut self, visit: &SessionVisit) -> VisitOutcome {
        let likely = visit
            .longest_dwell
            .filter(|(dwell_ms, _)| *dwell_ms > MOST_LIKELY_MIN_DWELL_MS)
            .map(|(_, value)| value);

        match self.users.get_mut(&visit.user_id) {
            Some(summary) if summary.has_session(&visit.session_id) => VisitOutcome::Unchanged,
            Some(summary) => {
                summary.last_seen = summary.last_seen.max(visit.seen_at);
                summary.session_count += 1;
                summary.total_time_sec += visit.session_seconds.max(0.0);
                if likely.is_some() {
                    summary.most_likely_value = likely;
                }
                summary.last_session_id = visit.session_id.clone();
                summary.session_ids.insert(visit.session_id.clone());
                VisitOutcome::Updated
            }
            None => {
                self.users.insert(
                    visit.user_id.clone(),
                    UserSummary {
                        user_id: visit.user_id.clone(),
                        first_seen: visit.seen_at,
                        last_seen: visit.seen_at,
                        session_count: 1,
                        total_time_sec: visit.session_seconds.max(0.0),
                        most_likely_value: likely,
                        last_session_id: visit.session_id.clone(),
                        session_ids: BTreeSet::from([visit.session_id.clone()]),
                    },
                );
                VisitOutcome::Created
            }
        }
    }
}
