use url::form_urlencoded;

use super::types::{PageRequest, SortDirection};
use crate::config::PagingConfig;

/// Decoded query-string pairs. Repeated keys keep their order and lookups
/// return the first value.
#[derive(Debug, Clone, Default)]
pub struct QueryValues {
    pairs: Vec<(String, String)>,
}

impl QueryValues {
    pub fn parse(raw: &str) -> Self {
        Self {
            pairs: form_urlencoded::parse(raw.as_bytes()).into_owned().collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// True only when the value is exactly `expected`. Absent and any other
    /// value are both false.
    pub fn flag(&self, key: &str, expected: &str) -> bool {
        self.get(key) == Some(expected)
    }

    /// Base-10 integer, or `default` when absent or unparseable
    pub fn int(&self, key: &str, default: i64) -> i64 {
        self.get(key)
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(default)
    }
}

impl PageRequest {
    /// Build a page from the raw query string. Never fails: malformed values
    /// take their defaults and `limit` is clamped to the configured maximum.
    pub fn from_query(raw: Option<&str>, paging: &PagingConfig) -> Self {
        let values = QueryValues::parse(raw.unwrap_or_default());

        let order = if values.flag("order", "asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        };

        let limit = match values.int("limit", paging.default_limit) {
            n if n > 0 => n,
            _ => paging.default_limit,
        };

        let offset = match values.int("offset", 0) {
            n if n >= 0 => n,
            _ => 0,
        };

        Self {
            limit: limit.min(paging.max_limit),
            offset,
            order,
            done_only: values.flag("done", "true"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(raw: &str) -> PageRequest {
        PageRequest::from_query(Some(raw), &PagingConfig::default())
    }

    #[test]
    fn first_value_wins() {
        let values = QueryValues::parse("order=asc&order=desc");
        assert_eq!(values.get("order"), Some("asc"));
        assert_eq!(values.get("missing"), None);
    }

    #[test]
    fn flag_needs_exact_literal() {
        let values = QueryValues::parse("order=ASC&done=true&empty=");
        assert!(!values.flag("order", "asc"));
        assert!(values.flag("done", "true"));
        assert!(!values.flag("empty", "true"));
        assert!(!values.flag("absent", "true"));
    }

    #[test]
    fn int_falls_back_on_garbage() {
        let values = QueryValues::parse("limit=abc&offset=%2B5&big=99999999999999999999");
        assert_eq!(values.int("limit", 10), 10);
        assert_eq!(values.int("offset", 0), 5);
        assert_eq!(values.int("big", 7), 7);
        assert_eq!(values.int("absent", 3), 3);
    }

    #[test]
    fn defaults_when_query_is_absent() {
        let page = PageRequest::from_query(None, &PagingConfig::default());
        assert_eq!(
            page,
            PageRequest {
                limit: 10,
                offset: 0,
                order: SortDirection::Desc,
                done_only: false,
            }
        );
    }

    #[test]
    fn parses_every_parameter() {
        let parsed = page("order=asc&done=true&limit=25&offset=50");
        assert_eq!(parsed.order, SortDirection::Asc);
        assert!(parsed.ascending());
        assert!(parsed.done_only);
        assert_eq!(parsed.limit, 25);
        assert_eq!(parsed.offset, 50);
    }

    #[test]
    fn malformed_numbers_use_defaults() {
        let garbage = page("limit=abc&offset=xyz");
        assert_eq!(garbage.limit, 10);
        assert_eq!(garbage.offset, 0);

        let out_of_range = page("limit=0&offset=-4");
        assert_eq!(out_of_range.limit, 10);
        assert_eq!(out_of_range.offset, 0);
    }

    #[test]
    fn limit_is_clamped() {
        let paging = PagingConfig {
            default_limit: 10,
            max_limit: 50,
        };
        let page = PageRequest::from_query(Some("limit=100000"), &paging);
        assert_eq!(page.limit, 50);
    }
}
