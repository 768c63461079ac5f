//! URL query-string parsing.

use url::form_urlencoded;

/// Decoded `key=value` pairs of a page URL's query string, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse `?a=1&b=two`, with or without the leading `?`.
    ///
    /// Segments with an empty key are ignored. `+` decodes to a space and
    /// `%XX` escapes are decoded; malformed escapes are kept literally.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = form_urlencoded::parse(query.as_bytes())
            .filter(|(key, _)| !key.is_empty())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Any parameter at all can pre-filter a grid, which conflicts with
    /// restoring or saving its layout.
    pub fn has_conflicts(&self) -> bool {
        !self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_has_no_conflicts() {
        assert!(!QueryParams::parse("").has_conflicts());
        assert!(!QueryParams::parse("?").has_conflicts());
        assert!(!QueryParams::parse("?&&").has_conflicts());
    }

    #[test]
    fn decodes_pairs() {
        let params = QueryParams::parse("?employeeId=42&name=Ada+L%C3%B3pez&flag");
        assert_eq!(params.get("employeeId"), Some("42"));
        assert_eq!(params.get("name"), Some("Ada López"));
        assert_eq!(params.get("flag"), Some(""));
        assert_eq!(params.len(), 3);
        assert!(params.has_conflicts());
    }

    #[test]
    fn malformed_escape_is_literal() {
        assert_eq!(QueryParams::parse("q=100%").get("q"), Some("100%"));
        assert_eq!(QueryParams::parse("q=%zz").get("q"), Some("%zz"));
    }

    #[test]
    fn empty_keys_are_skipped_and_escaped_plus_is_kept() {
        let params = QueryParams::parse("=orphan&sum=1%2B1");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("sum"), Some("1+1"));
    }
}
