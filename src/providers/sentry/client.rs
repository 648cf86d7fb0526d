mod core;
mod events;
mod issues;

pub use self::core::{SentryClient, DEFAULT_HOST, DEFAULT_MAX_CONCURRENT_REQUESTS};
