//! Session persistence
//!
//! An append-only session sheet (one row per analysed session, header written
//! lazily on first append) plus a per-user summary sheet that is the only data
//! ever rewritten in place.

pub mod csv_store;
pub mod layout;
pub mod memory;
pub mod users;

pub use csv_store::CsvStore;
pub use layout::{Cell, SessionLayout};
pub use memory::MemoryStore;
pub use users::{SessionVisit, UserSummary, UserSummaryBook, VisitOutcome};

use crate::config::{Dimension, DomainConfig};
use crate::error::InsightError;
use crate::types::{BehaviorProfile, NormalizedSession, SessionPayload};
use chrono::{DateTime, Utc};
use tracing::info;

/// Backend holding the session and user sheets
pub trait RowStore {
    /// Header row of the session sheet, if it has been written
    fn session_header(&self) -> Result<Option<Vec<String>>, InsightError>;

    /// Write the session sheet header; only called on an empty sheet
    fn write_session_header(&mut self, header: &[String]) -> Result<(), InsightError>;

    /// Append one session row
    fn append_session_row(&mut self, row: &[String]) -> Result<(), InsightError>;

    /// Load every user summary
    fn load_users(&self) -> Result<Vec<UserSummary>, InsightError>;

    /// Replace the user sheet with the given summaries
    fn save_users(&mut self, users: &[UserSummary]) -> Result<(), InsightError>;
}

/// What recording one session produced
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub row: Vec<String>,
    pub user: Option<UserSummary>,
    pub visit: VisitOutcome,
}

/// Writes analysed sessions into a `RowStore` using a domain's layout
pub struct SessionRecorder<S: RowStore> {
    store: S,
    layout: SessionLayout,
    exploration_dimension: Dimension,
}

impl<S: RowStore> SessionRecorder<S> {
    pub fn new(store: S, config: &DomainConfig) -> Self {
        Self {
            store,
            layout: SessionLayout::new(config),
            exploration_dimension: config.exploration_dimension,
        }
    }

    pub fn layout(&self) -> &SessionLayout {
        &self.layout
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Append the session row and fold the session into the user summary
    pub fn record(
        &mut self,
        timestamp: DateTime<Utc>,
        payload: &SessionPayload,
        session: &NormalizedSession,
        profile: &BehaviorProfile,
    ) -> Result<RecordOutcome, InsightError> {
        self.ensure_header()?;

        let row: Vec<String> = self
            .layout
            .row(timestamp, payload, session, profile)
            .iter()
            .map(Cell::render)
            .collect();
        self.store.append_session_row(&row)?;

        info!(
            session_id = %session.session_id,
            user_id = %session.user_id,
            behavior = profile.behavior_type.label(),
            "appended session row"
        );

        let visit = SessionVisit {
            user_id: session.user_id.clone(),
            session_id: session.session_id.clone(),
            seen_at: timestamp,
            session_seconds: session.total_session_seconds,
            longest_dwell: self.longest_dwell(session),
        };

        let mut book = UserSummaryBook::from_records(self.store.load_users()?);
        let outcome = book.apply(&visit);
        if outcome != VisitOutcome::Unchanged {
            self.store.save_users(&book.records())?;
        }

        Ok(RecordOutcome {
            row,
            user: book.get(&session.user_id).cloned(),
            visit: outcome,
        })
    }

    fn ensure_header(&mut self) -> Result<(), InsightError> {
        match self.store.session_header()? {
            None => {
                info!(columns = self.layout.headers().len(), "creating session sheet header");
                self.store.write_session_header(self.layout.headers())
            }
            Some(existing) if existing == self.layout.headers() => Ok(()),
            Some(existing) => Err(InsightError::StoreError(format!(
                "session sheet has {} columns that do not match the configured layout ({} columns)",
                existing.len(),
                self.layout.headers().len()
            ))),
        }
    }

    /// Longest-dwell configuration, earliest wins on ties
    fn longest_dwell(&self, session: &NormalizedSession) -> Option<(u64, f64)> {
        // max_by_key keeps the last maximum, so walk the history backwards
        session
            .history
            .iter()
            .rev()
            .max_by_key(|s| s.duration_ms)
            .map(|s| {
                let value = match self.exploration_dimension {
                    Dimension::Outcome => s.outcome,
                    Dimension::Scale => s.scale,
                };
                (s.duration_ms, value)
            })
    }
}
