//! Client-side wildcard matching for resource names

use regex::Regex;

/// Shell-style name pattern where `*` matches any run of characters.
/// Every other character matches literally.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    raw: String,
    regex: Regex,
}

impl WildcardPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        Ok(Self {
            raw: pattern.to_string(),
            regex: Regex::new(&format!("^{}$", body))?,
        })
    }

    /// Whether `pattern` needs client-side expansion.
    pub fn is_wildcard(pattern: &str) -> bool {
        pattern.contains('*')
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Keep the names matching this pattern, in input order.
    pub fn filter<'a, I>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter(|name| self.matches(name))
            .map(str::to_string)
            .collect()
    }
}

/// Whether `name` matches any of `patterns`. An empty pattern list matches
/// everything.
pub fn matches_any(patterns: &[WildcardPattern], name: &str) -> bool {
    patterns.is_empty() || patterns.iter().any(|p| p.matches(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_wildcard() {
        let pattern = WildcardPattern::new("logs-*").unwrap();
        assert!(pattern.matches("logs-2024-01"));
        assert!(pattern.matches("logs-"));
        assert!(!pattern.matches("other"));
        assert!(!pattern.matches("xlogs-1"));
    }

    #[test]
    fn test_inner_wildcard_and_literals() {
        let pattern = WildcardPattern::new("app.*-v1").unwrap();
        assert!(pattern.matches("app.web-v1"));
        assert!(!pattern.matches("appxweb-v1"));
        assert!(!pattern.matches("app.web-v10"));
    }

    #[test]
    fn test_filter_keeps_order() {
        let pattern = WildcardPattern::new("logs-*").unwrap();
        let names = ["logs-2024-01", "logs-2024-02", "other"];
        assert_eq!(
            pattern.filter(names.iter().copied()),
            vec!["logs-2024-01", "logs-2024-02"]
        );
    }

    #[test]
    fn test_matches_any() {
        let patterns = vec![
            WildcardPattern::new("a*").unwrap(),
            WildcardPattern::new("b").unwrap(),
        ];
        assert!(matches_any(&patterns, "abc"));
        assert!(matches_any(&patterns, "b"));
        assert!(!matches_any(&patterns, "bc"));
        assert!(matches_any(&[], "anything"));
    }
}
