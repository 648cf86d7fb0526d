mod sentry;

pub use sentry::{
    header, parse_enrichments, project_issue, ExportSummary, Issue, Row, SentryProvider,
    DEFAULT_HOST, DEFAULT_MAX_CONCURRENT_REQUESTS,
};
