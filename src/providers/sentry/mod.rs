mod client;
mod enrichment;
mod links;
mod provider;
mod query;
mod rows;
mod types;

pub use client::{DEFAULT_HOST, DEFAULT_MAX_CONCURRENT_REQUESTS};
pub use enrichment::parse_enrichments;
pub use provider::{ExportSummary, SentryProvider};
pub use rows::{header, project_issue, Row};
pub use types::Issue;
