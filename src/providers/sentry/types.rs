use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{ExportError, Result};

/// A Sentry issue as returned by the issues endpoint.
///
/// The record is kept as raw JSON; only the fields used for the CSV row are
/// ever read. `enrichments` is filled in by the enrichment phase and maps a
/// CSV column to the value pulled from the issue's latest event.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub data: Value,
    pub enrichments: Option<IndexMap<String, Value>>,
}

impl Issue {
    pub fn id(&self) -> Result<String> {
        match self.data.get("id") {
            Some(Value::String(id)) => Ok(id.clone()),
            Some(Value::Number(id)) => Ok(id.to_string()),
            _ => Err(ExportError::MalformedRecord(
                "issue without an `id` field".to_string(),
            )),
        }
    }

    /// Looks up a nested field, e.g. `["metadata", "value"]`.
    pub fn field(&self, path: &[&str]) -> Option<&Value> {
        path.iter()
            .try_fold(&self.data, |current, key| current.get(key))
    }

    /// Like [`Issue::field`] but a missing field is an error.
    pub fn required_field(&self, path: &[&str]) -> Result<&Value> {
        self.field(path).ok_or_else(|| {
            ExportError::MalformedRecord(format!(
                "issue {} has no `{}` field",
                self.describe(),
                path.join(".")
            ))
        })
    }

    fn describe(&self) -> String {
        self.id().unwrap_or_else(|_| "<unknown>".to_string())
    }
}

impl From<Value> for Issue {
    fn from(data: Value) -> Self {
        Self {
            data,
            enrichments: None,
        }
    }
}

/// Shape of a decoded issues page.
///
/// Sentry answers a list request with a JSON array, or with an object carrying
/// a `detail` message when the request is rejected (e.g. an invalid query).
#[derive(Debug, Clone, PartialEq)]
pub enum PageBody {
    Page(Vec<Value>),
    ApiErrorBody(String),
    Unexpected(Value),
}

impl From<Value> for PageBody {
    fn from(body: Value) -> Self {
        match body {
            Value::Array(items) => Self::Page(items),
            Value::Object(mut map) => match map.remove("detail") {
                Some(Value::String(detail)) => Self::ApiErrorBody(detail),
                Some(detail) => Self::ApiErrorBody(detail.to_string()),
                None => Self::Unexpected(Value::Object(map)),
            },
            other => Self::Unexpected(other),
        }
    }
}
