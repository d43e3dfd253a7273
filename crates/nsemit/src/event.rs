//! Event specifiers and their parsed form.
//!
//! An event specifier is either one string (`"save"`, `"save.user.admin"`)
//! or a sequence of such strings. The part before the first `.` is the event
//! name; everything after it is split on `.` into namespace tokens.

use crate::filter::NamespaceFilter;

/// Separator between an event name and its namespaces.
pub const NAMESPACE_SEPARATOR: char = '.';

/// Event name whose listeners are notified after every registration.
pub const NEW_LISTENER: &str = "newListener";

/// Event name whose listeners are notified before every removal.
pub const REMOVE_LISTENER: &str = "removeListener";

/// One event string or a sequence of them.
///
/// A sequence fans out: the operation runs once per entry, in order, as if
/// called separately for each. An empty sequence is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSpecifier {
    One(String),
    Many(Vec<String>),
}

impl EventSpecifier {
    /// Iterates the individual event strings in call order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let items: &[String] = match self {
            Self::One(event) => std::slice::from_ref(event),
            Self::Many(events) => events,
        };
        items.iter().map(String::as_str)
    }

    /// Returns true if the specifier names no event at all.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Many(events) if events.is_empty())
    }
}

impl From<&str> for EventSpecifier {
    fn from(event: &str) -> Self {
        Self::One(event.to_string())
    }
}

impl From<String> for EventSpecifier {
    fn from(event: String) -> Self {
        Self::One(event)
    }
}

impl From<&String> for EventSpecifier {
    fn from(event: &String) -> Self {
        Self::One(event.clone())
    }
}

impl From<Vec<String>> for EventSpecifier {
    fn from(events: Vec<String>) -> Self {
        Self::Many(events)
    }
}

impl From<Vec<&str>> for EventSpecifier {
    fn from(events: Vec<&str>) -> Self {
        Self::Many(events.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for EventSpecifier {
    fn from(events: &[&str]) -> Self {
        Self::Many(events.iter().map(|e| e.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for EventSpecifier {
    fn from(events: [&str; N]) -> Self {
        Self::Many(events.iter().map(|e| e.to_string()).collect())
    }
}

/// An event string split into its name and namespace query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent {
    /// Event name; empty means "every event" for removal and introspection.
    pub name: String,
    /// Namespace query; absent when the string had no separator.
    pub filter: NamespaceFilter,
}

impl ParsedEvent {
    /// Splits `event` at the first separator.
    ///
    /// Empty tokens are kept verbatim, so `"save."` carries the namespace `""`.
    pub fn parse(event: &str) -> Self {
        match event.split_once(NAMESPACE_SEPARATOR) {
            Some((name, rest)) => Self {
                name: name.to_string(),
                filter: NamespaceFilter::new(
                    rest.split(NAMESPACE_SEPARATOR).map(String::from).collect(),
                ),
            },
            None => Self {
                name: event.to_string(),
                filter: NamespaceFilter::any(),
            },
        }
    }

    /// Namespaces to attach to a listener registered with this event string.
    pub fn namespaces(&self) -> Vec<String> {
        self.filter.tokens().map(<[String]>::to_vec).unwrap_or_default()
    }

    /// Returns true if the name addresses every event (`""`).
    pub fn is_wildcard(&self) -> bool {
        self.name.is_empty()
    }
}
