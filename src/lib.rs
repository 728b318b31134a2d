//! calc-insight - Behavioral session analytics for web-based financial calculators
//!
//! A calculator front-end reports one session payload when the visitor leaves:
//! every configuration they tried, how long each stayed on screen, and where
//! they ended up. calc-insight turns that payload into a behavior profile through
//! a deterministic pipeline: payload parsing → snapshot resolution → trend,
//! exploration and confidence analysis → natural-language summary.
//!
//! ## Modules
//!
//! - **Analysis**: The pure profile computation, parameterised by a `DomainConfig`
//! - **Ingest**: Request-body decoding and the `{success, error}` response envelope
//! - **Store**: Append-only session rows and per-user summaries (CSV or in-memory)

pub mod adapter;
pub mod analysis;
pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod store;
pub mod types;

pub use config::DomainConfig;
pub use error::InsightError;
pub use ingest::{IngestEndpoint, IngestResponse};
pub use pipeline::{analyze_session_json, compute_behavior_profile, SessionAnalyzer};
pub use store::{CsvStore, MemoryStore, RowStore};
pub use types::{BehaviorProfile, SessionPayload};

/// calc-insight version reported by the CLI
pub const INSIGHT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for emitted reports
pub const PRODUCER_NAME: &str = "calc-insight";
