//! Namespace matching for dispatch, removal and introspection.

/// Namespace query derived from an event string.
///
/// A listener matches when every query token is among its own namespaces.
/// Order and duplicates do not matter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceFilter {
    tokens: Option<Vec<String>>,
}

impl NamespaceFilter {
    /// Filter that matches every listener, namespaced or not.
    pub fn any() -> Self {
        Self::default()
    }

    /// Filter requiring all of `tokens`.
    pub fn new(tokens: Vec<String>) -> Self {
        Self {
            tokens: Some(tokens),
        }
    }

    /// The query tokens, or `None` for a bare event name.
    pub fn tokens(&self) -> Option<&[String]> {
        self.tokens.as_deref()
    }

    /// Returns true if a listener carrying `namespaces` matches this filter.
    pub fn matches(&self, namespaces: &[String]) -> bool {
        let Some(query) = self.tokens.as_deref() else {
            return true;
        };
        if query.is_empty() {
            return true;
        }
        if namespaces.is_empty() {
            return false;
        }
        query.iter().all(|token| namespaces.contains(token))
    }
}
