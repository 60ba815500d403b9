use std::fmt;

use crate::constants::NOTES_QUERY_SCOPE;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Text(String),
    Number(u64),
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Text(s) => write!(f, "{s:?}"),
            KeyPart::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Ordered list of segments identifying one cached result.
///
/// Prefix matching is segment-wise: `["notes"]` matches
/// `["notes", "cat", 1]` but not `["notebooks"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    pub fn new(scope: &str) -> Self {
        Self(vec![KeyPart::Text(scope.to_string())])
    }

    pub fn text(mut self, value: impl Into<String>) -> Self {
        self.0.push(KeyPart::Text(value.into()));
        self
    }

    pub fn number(mut self, value: u64) -> Self {
        self.0.push(KeyPart::Number(value));
        self
    }

    /// Key of one page of list results.
    pub fn notes(search: &str, page: u32) -> Self {
        Self::new(NOTES_QUERY_SCOPE)
            .text(search)
            .number(u64::from(page))
    }

    /// Prefix shared by every list page.
    pub fn notes_prefix() -> Self {
        Self::new(NOTES_QUERY_SCOPE)
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{part}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_same_search_and_page_when_building_keys_then_keys_are_equal() {
        assert_eq!(QueryKey::notes("cat", 1), QueryKey::notes("cat", 1));
        assert_ne!(QueryKey::notes("cat", 1), QueryKey::notes("cat", 2));
        assert_ne!(QueryKey::notes("cat", 1), QueryKey::notes("dog", 1));
    }

    #[test]
    fn given_notes_prefix_when_matching_then_matches_every_page_key() {
        let prefix = QueryKey::notes_prefix();
        assert!(QueryKey::notes("", 1).starts_with(&prefix));
        assert!(QueryKey::notes("cat", 7).starts_with(&prefix));
        assert!(!QueryKey::new("notebooks").starts_with(&prefix));
    }

    #[test]
    fn given_longer_prefix_when_matching_then_requires_every_segment() {
        let prefix = QueryKey::notes_prefix().text("cat");
        assert!(QueryKey::notes("cat", 3).starts_with(&prefix));
        assert!(!QueryKey::notes("ca", 3).starts_with(&prefix));
    }

    #[test]
    fn given_key_when_displaying_then_renders_segments() {
        assert_eq!(QueryKey::notes("cat", 2).to_string(), r#"["notes", "cat", 2]"#);
    }
}
