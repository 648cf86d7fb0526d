use serde_json::{Map, Value};

use crate::error::{ExportError, Result};

/// An extra CSV column filled from a field of an issue's latest event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    /// Column header in the CSV output
    pub csv_field: String,
    /// Keys leading to the value inside the event, outermost first
    pub sentry_path: Vec<String>,
}

impl Enrichment {
    /// Parses a single `path.to.field=Column Name` mapping.
    pub fn from_mapping(mapping: &str) -> Result<Self> {
        let Some((path, csv_field)) = mapping.split_once('=') else {
            return Err(ExportError::Config(format!(
                "enrichment mapping '{mapping}' must look like 'path.to.field=Column Name'"
            )));
        };

        if csv_field.is_empty() || csv_field.contains('=') {
            return Err(ExportError::Config(format!(
                "enrichment mapping '{mapping}' needs a column name without '='"
            )));
        }

        let sentry_path: Vec<String> = path.split('.').map(ToString::to_string).collect();
        if sentry_path.iter().any(String::is_empty) {
            return Err(ExportError::Config(format!(
                "enrichment mapping '{mapping}' has an empty path segment"
            )));
        }

        Ok(Self {
            csv_field: csv_field.to_string(),
            sentry_path,
        })
    }

    /// Looks up this enrichment's path in an event.
    ///
    /// Missing keys resolve to an empty string, as does a path that ends on an
    /// empty object. Any other terminal value (including `0`, `false` and
    /// non-empty objects) is returned unchanged. Stepping through a value that
    /// is not an object is an error.
    pub fn extract(&self, event: &Map<String, Value>) -> Result<Value> {
        let mut segments = self.sentry_path.iter();
        let mut current = match segments.next() {
            Some(first) => event.get(first),
            None => None,
        };

        for segment in segments {
            current = match current {
                // An absent key stands for an empty object, so it stays absent.
                None => None,
                Some(Value::Object(map)) => map.get(segment),
                Some(other) => {
                    return Err(ExportError::MalformedRecord(format!(
                        "cannot look up '{segment}' for column '{}': expected an object, got {other}",
                        self.csv_field
                    )))
                }
            };
        }

        Ok(match current {
            None => Value::String(String::new()),
            Some(Value::Object(map)) if map.is_empty() => Value::String(String::new()),
            Some(value) => value.clone(),
        })
    }
}

/// Parses the `--enrich` argument: comma-separated `path=Column` mappings.
///
/// Order is preserved, as it decides the order of the extra CSV columns.
pub fn parse_enrichments(mappings: Option<&str>) -> Result<Vec<Enrichment>> {
    let Some(mappings) = mappings else {
        return Ok(Vec::new());
    };

    mappings.split(',').map(Enrichment::from_mapping).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn enrichment(csv_field: &str, sentry_path: &[&str]) -> Enrichment {
        Enrichment {
            csv_field: csv_field.to_string(),
            sentry_path: sentry_path.iter().map(ToString::to_string).collect(),
        }
    }

    fn event(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test event must be an object"),
        }
    }

    #[test]
    fn test_parse_enrichments() {
        let enrichments = parse_enrichments(Some("a.b=Label One,c=Label Two")).unwrap();
        assert_eq!(
            enrichments,
            vec![
                enrichment("Label One", &["a", "b"]),
                enrichment("Label Two", &["c"]),
            ]
        );
    }

    #[test]
    fn test_parse_enrichments_sentry_paths() {
        let enrichments = parse_enrichments(Some(
            "packages.sentry2csv.version=Sentry Version,no-dot=No Dot",
        ))
        .unwrap();
        assert_eq!(
            enrichments,
            vec![
                enrichment("Sentry Version", &["packages", "sentry2csv", "version"]),
                enrichment("No Dot", &["no-dot"]),
            ]
        );
    }

    #[test]
    fn test_parse_enrichments_none() {
        let enrichments = tokio_test::assert_ok!(parse_enrichments(None));
        assert!(enrichments.is_empty());
    }

    #[test]
    fn test_parse_enrichments_malformed() {
        for mapping in ["no-equals-sign", "=Label", "a..b=Label", "a.b=", "a=b=c", "a=A,,b=B"] {
            let result = parse_enrichments(Some(mapping));
            assert!(
                matches!(result, Err(ExportError::Config(_))),
                "expected config error for {mapping:?}"
            );
        }
    }

    #[test]
    fn test_extract_nested_value() {
        let column = enrichment("C", &["a", "b", "c"]);
        let value = column
            .extract(&event(json!({"a": {"b": {"c": 5}}})))
            .unwrap();
        assert_eq!(value, json!(5));
    }

    #[test]
    fn test_extract_dead_end_is_empty_string() {
        let column = enrichment("C", &["a", "b", "c"]);
        assert_eq!(column.extract(&event(json!({"a": {}}))).unwrap(), json!(""));
        assert_eq!(column.extract(&event(json!({"x": 1}))).unwrap(), json!(""));
        assert_eq!(
            column
                .extract(&event(json!({"a": {"b": {"c": {}}}})))
                .unwrap(),
            json!("")
        );
    }

    #[test]
    fn test_extract_keeps_falsy_and_structured_values() {
        let zero = enrichment("Zero", &["zero"]);
        let flag = enrichment("Flag", &["flag"]);
        let nested = enrichment("Nested", &["nested"]);
        let data = event(json!({"zero": 0, "flag": false, "nested": {"k": "v"}}));

        assert_eq!(zero.extract(&data).unwrap(), json!(0));
        assert_eq!(flag.extract(&data).unwrap(), json!(false));
        assert_eq!(nested.extract(&data).unwrap(), json!({"k": "v"}));
    }

    #[test]
    fn test_extract_through_scalar_fails() {
        let column = enrichment("Deep", &["a", "b"]);
        let result = column.extract(&event(json!({"a": 13})));
        assert!(matches!(result, Err(ExportError::MalformedRecord(_))));
    }
}
