use std::fmt;

/// A single `field:value` term of Sentry's issue search syntax.
///
/// Values are not escaped; a value containing a space changes the meaning of the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    field: String,
    value: String,
}

impl QueryParam {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.value)
    }
}

/// Joins query terms with spaces, as typed into Sentry's search bar.
pub fn join_query(params: &[QueryParam]) -> String {
    params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds the issue filter: unresolved issues, optionally limited to one environment.
pub fn issue_filter(environment: Option<&str>) -> Vec<QueryParam> {
    let mut params = vec![QueryParam::new("is", "unresolved")];
    if let Some(environment) = environment {
        params.push(QueryParam::new("environment", environment));
    }
    params
}
