use indexmap::IndexMap;
use log::warn;
use serde_json::Value;

use super::types::Issue;
use crate::error::{ExportError, Result};

/// Columns every export starts with, in order.
pub const BASE_COLUMNS: [&str; 7] = [
    "Error", "Location", "Details", "Events", "Users", "Notes", "Link",
];

/// One CSV row keyed by column name.
pub type Row = IndexMap<String, String>;

/// Renders a JSON value as CSV cell text.
///
/// Strings are written without quotes, `null` as an empty cell and anything
/// structured as compact JSON.
pub fn cell(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Picks the Error and Details columns according to the issue's `type`.
fn error_and_details(issue: &Issue) -> Result<(String, String)> {
    let issue_type = match issue.required_field(&["type"])? {
        Value::String(issue_type) => issue_type.as_str(),
        other => {
            return Err(ExportError::MalformedRecord(format!(
                "issue `type` should be a string, got {other}"
            )))
        }
    };

    let fields = match issue_type {
        "error" => (
            issue
                .field(&["metadata", "type"])
                .map_or_else(|| issue_type.to_string(), cell),
            cell(issue.required_field(&["metadata", "value"])?),
        ),
        "csp" => (
            "csp".to_string(),
            cell(issue.required_field(&["metadata", "message"])?),
        ),
        "default" => (
            "default".to_string(),
            issue
                .field(&["metadata", "title"])
                .map(cell)
                .unwrap_or_default(),
        ),
        other => {
            warn!("Unexpected issue type '{other}', leaving Details empty");
            (other.to_string(), String::new())
        }
    };

    Ok(fields)
}

/// Projects an issue onto the base columns, then lays its enrichments over them.
///
/// An enrichment named like a base column replaces that column's value.
pub fn project_issue(issue: &Issue) -> Result<Row> {
    let (error, details) = error_and_details(issue)?;

    let mut row = Row::new();
    row.insert("Error".to_string(), error);
    row.insert(
        "Location".to_string(),
        cell(issue.required_field(&["culprit"])?),
    );
    row.insert("Details".to_string(), details);
    row.insert("Events".to_string(), cell(issue.required_field(&["count"])?));
    row.insert(
        "Users".to_string(),
        cell(issue.required_field(&["userCount"])?),
    );
    row.insert("Notes".to_string(), String::new());
    row.insert(
        "Link".to_string(),
        cell(issue.required_field(&["permalink"])?),
    );

    if let Some(enrichments) = &issue.enrichments {
        for (column, value) in enrichments {
            row.insert(column.clone(), cell(value));
        }
    }

    Ok(row)
}

/// Header for a set of issues: the base columns plus the first issue's
/// enrichment columns, which every other issue is assumed to share.
pub fn header(issues: &[Issue]) -> Vec<String> {
    let mut columns: Vec<String> = BASE_COLUMNS.iter().map(ToString::to_string).collect();

    if let Some(enrichments) = issues.first().and_then(|issue| issue.enrichments.as_ref()) {
        for column in enrichments.keys() {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }

    columns
}
