use std::collections::HashMap;

/// Attributes of a single link relation, e.g. `{"results": "true", "cursor": "1:100:0"}`.
///
/// The link target itself is stored under the `url` key.
pub type LinkAttributes = HashMap<String, String>;

/// Pagination metadata parsed from a `Link` response header, keyed by relation name.
///
/// Sentry sends headers like:
///
/// ```text
/// <https://sentry.io/api/0/...&cursor=0:0:1>; rel="previous"; results="false"; cursor="0:0:1",
/// <https://sentry.io/api/0/...&cursor=0:100:0>; rel="next"; results="true"; cursor="0:100:0"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links(HashMap<String, LinkAttributes>);

impl Links {
    pub fn parse(header: &str) -> Self {
        let mut links = HashMap::new();

        for entry in split_entries(header) {
            let entry = entry.trim();
            let Some(rest) = entry.strip_prefix('<') else {
                continue;
            };
            let Some((url, params)) = rest.split_once('>') else {
                continue;
            };

            let mut attributes = LinkAttributes::new();
            attributes.insert("url".to_string(), url.trim().to_string());

            for param in params.split(';') {
                let Some((key, value)) = param.split_once('=') else {
                    continue;
                };
                let value = value.trim().trim_matches('"');
                attributes.insert(key.trim().to_lowercase(), value.to_string());
            }

            if let Some(rel) = attributes.get("rel").cloned() {
                links.insert(rel, attributes);
            }
        }

        Self(links)
    }

    pub fn get(&self, rel: &str) -> Option<&LinkAttributes> {
        self.0.get(rel)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Commas inside `<...>` or a quoted value do not separate entries.
fn split_entries(header: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut in_angle = false;
    let mut in_quote = false;
    let mut start = 0;

    for (i, c) in header.char_indices() {
        match c {
            '<' if !in_quote => in_angle = true,
            '>' if !in_quote => in_angle = false,
            '"' if !in_angle => in_quote = !in_quote,
            ',' if !in_angle && !in_quote => {
                entries.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(&header[start..]);

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTRY_LINK: &str = "<https://sentry.io/api/0/projects/org/proj/issues/?&cursor=1:0:1>; \
        rel=\"previous\"; results=\"false\"; cursor=\"1:0:1\", \
        <https://sentry.io/api/0/projects/org/proj/issues/?&cursor=1:100:0>; \
        rel=\"next\"; results=\"true\"; cursor=\"1:100:0\"";

    #[test]
    fn test_parse_sentry_link_header() {
        let links = Links::parse(SENTRY_LINK);

        let next = links.get("next").unwrap();
        assert_eq!(next["results"], "true");
        assert_eq!(next["cursor"], "1:100:0");
        assert_eq!(
            next["url"],
            "https://sentry.io/api/0/projects/org/proj/issues/?&cursor=1:100:0"
        );

        let previous = links.get("previous").unwrap();
        assert_eq!(previous["results"], "false");
    }

    #[test]
    fn test_parse_single_entry() {
        let links = Links::parse(
            "<http://www.sentry.io/testurl/?&cursor=12345:0:0>; rel=\"next\"; results=\"true\"; cursor=\"12345:0:0\"",
        );
        let next = links.get("next").unwrap();
        assert_eq!(next["results"], "true");
        assert_eq!(next["cursor"], "12345:0:0");
        assert!(links.get("previous").is_none());
    }

    #[test]
    fn test_parse_url_with_comma() {
        let links = Links::parse("<http://example.com/?a=1,2>; rel=\"next\"; cursor=\"x\"");
        assert_eq!(links.get("next").unwrap()["url"], "http://example.com/?a=1,2");
    }

    #[test]
    fn test_parse_empty_and_garbage() {
        assert!(Links::parse("").is_empty());
        assert!(Links::parse("not a link header").is_empty());
        assert!(Links::parse("<http://example.com/>; results=\"true\"").is_empty());
    }
}
