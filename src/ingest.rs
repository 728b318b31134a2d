//! Ingestion endpoint
//!
//! Accepts one request body per session, either raw JSON or a form-encoded body
//! carrying the JSON in its `data` field. Malformed input never reaches the
//! analytics; every outcome is reported as a `{success, error}` envelope.

use crate::adapter::parse_payload;
use crate::config::DomainConfig;
use crate::error::InsightError;
use crate::pipeline::SessionAnalyzer;
use crate::store::{RecordOutcome, RowStore, SessionRecorder};
use crate::types::BehaviorProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Form field carrying the session JSON
pub const DATA_FIELD: &str = "data";

/// Response envelope returned to the calculator front-end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IngestResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Extract the session JSON from a request body
pub fn decode_body(body: &str) -> Result<String, InsightError> {
    let trimmed = body.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed.to_string());
    }

    for pair in trimmed.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if form_decode(key)? == DATA_FIELD {
            return form_decode(value);
        }
    }

    Err(InsightError::MissingField(format!(
        "form field '{}' is missing from the request body",
        DATA_FIELD
    )))
}

fn form_decode(component: &str) -> Result<String, InsightError> {
    urlencoding::decode(&component.replace('+', " "))
        .map(|decoded| decoded.into_owned())
        .map_err(|e| InsightError::ParseError(format!("Invalid form encoding: {}", e)))
}

/// Endpoint binding a domain analyzer to a row store
pub struct IngestEndpoint<S: RowStore> {
    analyzer: SessionAnalyzer,
    recorder: SessionRecorder<S>,
}

impl<S: RowStore> IngestEndpoint<S> {
    pub fn new(config: DomainConfig, store: S) -> Self {
        Self {
            recorder: SessionRecorder::new(store, &config),
            analyzer: SessionAnalyzer::new(config),
        }
    }

    /// Plain-text banner for health checks
    pub fn banner(&self) -> &str {
        let config = self.analyzer.config();
        if config.banner.trim().is_empty() {
            &config.title
        } else {
            &config.banner
        }
    }

    pub fn analyzer(&self) -> &SessionAnalyzer {
        &self.analyzer
    }

    pub fn store(&self) -> &S {
        self.recorder.store()
    }

    pub fn into_store(self) -> S {
        self.recorder.into_store()
    }

    /// Handle a request body received now
    pub fn handle(&mut self, body: &str) -> IngestResponse {
        self.handle_at(body, Utc::now())
    }

    /// Handle a request body, stamping the row with `received_at`
    pub fn handle_at(&mut self, body: &str, received_at: DateTime<Utc>) -> IngestResponse {
        match self.process(body, received_at) {
            Ok(_) => IngestResponse::ok(),
            Err(e) => {
                warn!(error = %e, "rejected session payload");
                IngestResponse::failure(e.to_string())
            }
        }
    }

    /// Decode, analyse and persist one session
    pub fn process(
        &mut self,
        body: &str,
        received_at: DateTime<Utc>,
    ) -> Result<(BehaviorProfile, RecordOutcome), InsightError> {
        let json = decode_body(body)?;
        let payload = parse_payload(&json)?;
        let (session, profile) = self.analyzer.analyze(&payload)?;
        let outcome = self.recorder.record(received_at, &payload, &session, &profile)?;
        Ok((profile, outcome))
    }
}
