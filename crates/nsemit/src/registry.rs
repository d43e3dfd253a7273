//! Ordered event-name to listener-list storage.
//!
//! Event names keep first-registration order, listeners keep insertion
//! order. An event whose last listener goes away is dropped entirely, so a
//! present key always has at least one listener.

use crate::listener::{ListenerId, ListenerRecord};

pub(crate) struct Registry<T> {
    events: Vec<(String, Vec<ListenerRecord<T>>)>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<T> Registry<T> {
    fn position(&self, name: &str) -> Option<usize> {
        self.events.iter().position(|(event, _)| event == name)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&[ListenerRecord<T>]> {
        self.position(name).map(|i| self.events[i].1.as_slice())
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Appends `record` under its event and returns the new list length.
    pub(crate) fn push(&mut self, record: ListenerRecord<T>) -> usize {
        match self.position(record.event()) {
            Some(i) => {
                let list = &mut self.events[i].1;
                list.push(record);
                list.len()
            }
            None => {
                self.events.push((record.event().to_string(), vec![record]));
                1
            }
        }
    }

    /// Keeps only records satisfying `keep`; returns how many were dropped.
    pub(crate) fn retain<F>(&mut self, name: &str, mut keep: F) -> usize
    where
        F: FnMut(&ListenerRecord<T>) -> bool,
    {
        let Some(i) = self.position(name) else {
            return 0;
        };
        let list = &mut self.events[i].1;
        let before = list.len();
        list.retain(|record| keep(record));
        let removed = before - list.len();
        if list.is_empty() {
            self.events.remove(i);
        }
        removed
    }

    pub(crate) fn remove_id(&mut self, name: &str, id: ListenerId) -> bool {
        self.retain(name, |record| record.id() != id) > 0
    }

    pub(crate) fn clear(&mut self) -> usize {
        let count = self.len();
        self.events.clear();
        count
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.events.iter().map(|(name, _)| name.clone()).collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ListenerRecord<T>> {
        self.events.iter().flat_map(|(_, list)| list.iter())
    }

    pub(crate) fn len(&self) -> usize {
        self.events.iter().map(|(_, list)| list.len()).sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
