use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Sentry API access denied. Check that the token can read this project.")]
    AccessDenied,

    #[error("Sentry API error: {0}")]
    Api(String),

    #[error("Unexpected Sentry data: {0}. Run with -vv to debug.")]
    MalformedRecord(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request limiter closed")]
    LimiterClosed(#[from] tokio::sync::AcquireError),
}

pub type Result<T> = std::result::Result<T, ExportError>;
