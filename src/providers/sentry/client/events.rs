use serde_json::{Map, Value};

use super::core::SentryClient;
use crate::error::{ExportError, Result};

impl SentryClient {
    /// Fetches the most recent event of an issue.
    pub async fn fetch_latest_event(&self, issue_id: &str) -> Result<Map<String, Value>> {
        let url = self.endpoint(&format!("issues/{issue_id}/events/latest/"))?;
        let (body, _) = self.fetch(url, &[]).await?;

        match body {
            Value::Object(event) => Ok(event),
            other => Err(ExportError::MalformedRecord(format!(
                "expected the latest event of issue {issue_id} to be an object, got {other}"
            ))),
        }
    }
}
