//! Emitter - synchronous, namespaced pub/sub registry.
//!
//! Listeners are registered under an event name, optionally tagged with
//! dot-delimited namespaces (`"save.user.admin"`). Emitting `"save"` reaches
//! every listener on `save`; emitting `"save.user"` reaches only those whose
//! namespaces include `user`.
//!
//! All methods take `&self`. The registry sits behind an `RwLock` that is
//! never held while a callback runs, so listeners may call `on`, `off` and
//! `emit` on the same emitter during dispatch.

use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace, warn};

use crate::config::{DispatchMode, EmitterConfig};
use crate::error::{EmitterError, Result};
use crate::event::{EventSpecifier, ParsedEvent, NEW_LISTENER, REMOVE_LISTENER};
use crate::filter::NamespaceFilter;
use crate::listener::{Binding, ListenerId, ListenerRecord, Payload};
use crate::registry::Registry;

/// Synchronous event emitter with namespace-scoped listeners.
///
/// `T` is the argument type forwarded by [`emit`](Self::emit). Listeners run
/// in registration order on the calling thread; a failing listener stops the
/// emission and its error is returned to the caller.
///
/// # Example
///
/// ```
/// use nsemit::{Emitter, Listener};
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let log = Arc::clone(&seen);
/// let listener = Listener::from_fn(move |payload| {
///     log.lock().unwrap().extend_from_slice(payload.args());
/// });
///
/// let emitter: Emitter<i32> = Emitter::new();
/// emitter.on("tick.ui", &listener)?;
/// emitter.emit("tick", &[1])?.emit("tick.ui", &[2])?.emit("tick.net", &[3])?;
///
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
/// # Ok::<(), nsemit::EmitterError>(())
/// ```
pub struct Emitter<T> {
    config: EmitterConfig,
    events: RwLock<Registry<T>>,
}

impl<T> Emitter<T> {
    /// Creates an emitter with default settings.
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default())
    }

    pub fn with_config(config: EmitterConfig) -> Self {
        Self {
            config,
            events: RwLock::new(Registry::default()),
        }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Registry<T>>> {
        self.events
            .read()
            .map_err(|e| EmitterError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Registry<T>>> {
        self.events
            .write()
            .map_err(|e| EmitterError::LockPoisoned(e.to_string()))
    }

    fn has_listeners(&self, name: &str) -> Result<bool> {
        Ok(self.read()?.contains(name))
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Registers `listener` for every event in `event`.
    ///
    /// After each record is stored, `newListener` listeners (other than the
    /// record itself) are notified with the event name and the new record.
    pub fn on(
        &self,
        event: impl Into<EventSpecifier>,
        listener: impl Into<Binding<T>>,
    ) -> Result<&Self> {
        self.register(event.into(), vec![listener.into()], false)
    }

    /// Registers several listeners at once, in the order given.
    ///
    /// An empty listener list is a no-op.
    pub fn on_each<I, B>(&self, event: impl Into<EventSpecifier>, listeners: I) -> Result<&Self>
    where
        I: IntoIterator<Item = B>,
        B: Into<Binding<T>>,
    {
        self.register(
            event.into(),
            listeners.into_iter().map(Into::into).collect(),
            false,
        )
    }

    /// Same as [`on`](Self::on).
    pub fn add_listener(
        &self,
        event: impl Into<EventSpecifier>,
        listener: impl Into<Binding<T>>,
    ) -> Result<&Self> {
        self.on(event, listener)
    }

    /// Registers `listener` to run at most once per matching registration.
    ///
    /// The record is removed right after the first emission that fires it.
    pub fn once(
        &self,
        event: impl Into<EventSpecifier>,
        listener: impl Into<Binding<T>>,
    ) -> Result<&Self> {
        self.register(event.into(), vec![listener.into()], true)
    }

    /// Multi-listener form of [`once`](Self::once).
    pub fn once_each<I, B>(&self, event: impl Into<EventSpecifier>, listeners: I) -> Result<&Self>
    where
        I: IntoIterator<Item = B>,
        B: Into<Binding<T>>,
    {
        self.register(
            event.into(),
            listeners.into_iter().map(Into::into).collect(),
            true,
        )
    }

    fn register(&self, spec: EventSpecifier, bindings: Vec<Binding<T>>, once: bool) -> Result<&Self> {
        if bindings.is_empty() {
            return Ok(self);
        }
        for event in spec.iter() {
            for binding in &bindings {
                self.store(event, binding.clone(), once)?;
            }
        }
        Ok(self)
    }

    fn store(&self, event: &str, binding: Binding<T>, once: bool) -> Result<()> {
        let parsed = ParsedEvent::parse(event);
        let record = ListenerRecord::new(&parsed.name, binding, parsed.namespaces(), once);

        let (count, notify) = {
            let mut registry = self.write()?;
            let count = registry.push(record.clone());
            (count, registry.contains(NEW_LISTENER))
        };

        debug!(
            event = %parsed.name,
            id = %record.id(),
            namespaces = ?record.namespaces(),
            once,
            "listener added"
        );

        if let Some(max) = self.config.max_listeners {
            if count.checked_sub(1) == Some(max) {
                warn!(
                    event = %parsed.name,
                    count,
                    max,
                    "listener count exceeds limit, possible leak"
                );
            }
        }

        if notify {
            let payload = Payload::NewListener {
                event: &parsed.name,
                record: &record,
            };
            self.dispatch(NEW_LISTENER, &NamespaceFilter::any(), payload, Some(record.id()))?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Invokes every listener matching `event` with `args`.
    ///
    /// A sequence specifier emits each entry in turn. Emitting an event with
    /// no listeners is a no-op. If a listener fails, the remaining listeners
    /// for that emission are skipped and the error is returned.
    pub fn emit(&self, event: impl Into<EventSpecifier>, args: &[T]) -> Result<&Self> {
        let spec: EventSpecifier = event.into();
        for event in spec.iter() {
            let parsed = ParsedEvent::parse(event);
            self.dispatch(&parsed.name, &parsed.filter, Payload::Args(args), None)?;
        }
        Ok(self)
    }

    fn dispatch(
        &self,
        name: &str,
        filter: &NamespaceFilter,
        payload: Payload<'_, T>,
        skip: Option<ListenerId>,
    ) -> Result<()> {
        match self.config.dispatch {
            DispatchMode::Snapshot => self.dispatch_snapshot(name, filter, payload, skip),
            DispatchMode::Live => self.dispatch_live(name, filter, payload, skip),
        }
    }

    fn dispatch_snapshot(
        &self,
        name: &str,
        filter: &NamespaceFilter,
        payload: Payload<'_, T>,
        skip: Option<ListenerId>,
    ) -> Result<()> {
        let snapshot: Vec<ListenerRecord<T>> = {
            let registry = self.read()?;
            let Some(list) = registry.get(name) else {
                return Ok(());
            };
            list.iter()
                .filter(|record| Some(record.id()) != skip && filter.matches(record.namespaces()))
                .cloned()
                .collect()
        };

        for record in &snapshot {
            if !record.is_once() {
                self.invoke(name, record, &payload)?;
                continue;
            }
            // A nested emit may already have fired and removed it.
            if !self.write()?.remove_id(name, record.id()) {
                continue;
            }
            let fired = self.invoke(name, record, &payload);
            self.announce_removal(name, record)?;
            fired?;
        }
        Ok(())
    }

    /// Tells `removeListener` listeners that `record` left `name`.
    fn announce_removal(&self, name: &str, record: &ListenerRecord<T>) -> Result<()> {
        if !self.has_listeners(REMOVE_LISTENER)? {
            return Ok(());
        }
        debug!(event = %name, id = %record.id(), "once listener removed");
        let payload = Payload::RemoveListener {
            event: name,
            record,
        };
        self.dispatch(REMOVE_LISTENER, &NamespaceFilter::any(), payload, None)
    }

    fn dispatch_live(
        &self,
        name: &str,
        filter: &NamespaceFilter,
        payload: Payload<'_, T>,
        skip: Option<ListenerId>,
    ) -> Result<()> {
        let len = match self.read()?.get(name) {
            Some(list) => list.len(),
            None => return Ok(()),
        };

        let mut fired_once = false;
        for index in 0..len {
            let record = match self.read()?.get(name).and_then(|list| list.get(index)) {
                Some(record) => record.clone(),
                None => break,
            };
            if Some(record.id()) == skip || !filter.matches(record.namespaces()) {
                continue;
            }
            self.invoke(name, &record, &payload)?;
            fired_once |= record.is_once();
        }

        if fired_once {
            self.remove_where(name, |record| {
                record.is_once() && Some(record.id()) != skip && filter.matches(record.namespaces())
            })?;
        }
        Ok(())
    }

    fn invoke(&self, name: &str, record: &ListenerRecord<T>, payload: &Payload<'_, T>) -> Result<()> {
        trace!(event = %name, id = %record.id(), "invoking listener");
        record
            .invoke(payload)
            .map_err(|source| EmitterError::Listener {
                event: name.to_string(),
                source,
            })
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Removes every listener on every event.
    ///
    /// With `removeListener` listeners present, each removed record is
    /// announced before it goes; the `removeListener` records themselves are
    /// removed last, each hearing about its own removal.
    pub fn off_all(&self) -> Result<&Self> {
        if !self.has_listeners(REMOVE_LISTENER)? {
            let removed = self.write()?.clear();
            debug!(removed, "all listeners cleared");
            return Ok(self);
        }

        let names = self.read()?.names();
        for name in names.iter().filter(|name| name.as_str() != REMOVE_LISTENER) {
            self.remove_where(name, |_| true)?;
        }
        self.remove_where(REMOVE_LISTENER, |_| true)?;
        Ok(self)
    }

    /// Removes listeners by event.
    ///
    /// With namespaces (`"save.ui"`), removes every listener on the event
    /// whose namespaces match; an empty name (`".ui"`) applies that to every
    /// event. Without namespaces, removes the whole event.
    pub fn off(&self, event: impl Into<EventSpecifier>) -> Result<&Self> {
        let spec: EventSpecifier = event.into();
        for event in spec.iter() {
            let parsed = ParsedEvent::parse(event);
            if parsed.filter.tokens().is_some() {
                let filter = &parsed.filter;
                for name in self.target_names(&parsed)? {
                    self.remove_where(&name, |record| filter.matches(record.namespaces()))?;
                }
            } else {
                self.remove_where(&parsed.name, |_| true)?;
            }
        }
        Ok(self)
    }

    /// Removes the records registered from `listener` on `event`.
    ///
    /// Namespaces in `event` narrow the match further; an empty event name
    /// searches every event.
    pub fn off_listener(
        &self,
        event: impl Into<EventSpecifier>,
        listener: impl Into<Binding<T>>,
    ) -> Result<&Self> {
        self.unregister(event.into(), vec![listener.into()])
    }

    /// Multi-listener form of [`off_listener`](Self::off_listener).
    ///
    /// An empty listener list is a no-op.
    pub fn off_listeners<I, B>(&self, event: impl Into<EventSpecifier>, listeners: I) -> Result<&Self>
    where
        I: IntoIterator<Item = B>,
        B: Into<Binding<T>>,
    {
        self.unregister(event.into(), listeners.into_iter().map(Into::into).collect())
    }

    /// Same as [`off_listener`](Self::off_listener).
    pub fn remove_listener(
        &self,
        event: impl Into<EventSpecifier>,
        listener: impl Into<Binding<T>>,
    ) -> Result<&Self> {
        self.off_listener(event, listener)
    }

    /// Removes every listener of `event`, or of every event when `None`.
    pub fn remove_all_listeners(&self, event: Option<EventSpecifier>) -> Result<&Self> {
        match event {
            Some(event) => self.off(event),
            None => self.off_all(),
        }
    }

    fn unregister(&self, spec: EventSpecifier, bindings: Vec<Binding<T>>) -> Result<&Self> {
        if bindings.is_empty() {
            return Ok(self);
        }
        for event in spec.iter() {
            let parsed = ParsedEvent::parse(event);
            let filter = &parsed.filter;
            for name in self.target_names(&parsed)? {
                for binding in &bindings {
                    self.remove_where(&name, |record| {
                        record.is_bound_to(binding) && filter.matches(record.namespaces())
                    })?;
                }
            }
        }
        Ok(self)
    }

    /// Event names an operation on `parsed` applies to.
    fn target_names(&self, parsed: &ParsedEvent) -> Result<Vec<String>> {
        let registry = self.read()?;
        if parsed.is_wildcard() {
            Ok(registry.names())
        } else if registry.contains(&parsed.name) {
            Ok(vec![parsed.name.clone()])
        } else {
            Ok(Vec::new())
        }
    }

    /// Removes the records of `name` selected by `pred`, announcing each to
    /// `removeListener` listeners first when any are registered.
    fn remove_where<F>(&self, name: &str, pred: F) -> Result<usize>
    where
        F: Fn(&ListenerRecord<T>) -> bool,
    {
        if !self.has_listeners(REMOVE_LISTENER)? {
            let removed = self.write()?.retain(name, |record| !pred(record));
            if removed > 0 {
                debug!(event = %name, removed, "listeners removed");
            }
            return Ok(removed);
        }

        let victims: Vec<ListenerRecord<T>> = match self.read()?.get(name) {
            Some(list) => list.iter().filter(|record| pred(record)).cloned().collect(),
            None => return Ok(0),
        };

        let mut removed = 0;
        for record in &victims {
            if self.has_listeners(REMOVE_LISTENER)? {
                let payload = Payload::RemoveListener {
                    event: name,
                    record,
                };
                self.dispatch(REMOVE_LISTENER, &NamespaceFilter::any(), payload, None)?;
            }
            if self.write()?.remove_id(name, record.id()) {
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(event = %name, removed, "listeners removed with notification");
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Copies of every registered record, event by event, in insertion order.
    ///
    /// Returns an empty list if the registry lock is poisoned.
    pub fn listeners(&self) -> Vec<ListenerRecord<T>> {
        match self.events.read() {
            Ok(registry) => registry.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Copies of the records matching `event`.
    ///
    /// A sequence specifier concatenates the per-entry results, so
    /// overlapping queries can return the same record twice. An empty event
    /// name searches every event.
    pub fn listeners_for(&self, event: impl Into<EventSpecifier>) -> Vec<ListenerRecord<T>> {
        let Ok(registry) = self.events.read() else {
            return Vec::new();
        };

        let spec: EventSpecifier = event.into();
        let mut result = Vec::new();
        for event in spec.iter() {
            let parsed = ParsedEvent::parse(event);
            let matching = |record: &&ListenerRecord<T>| parsed.filter.matches(record.namespaces());
            if parsed.is_wildcard() {
                result.extend(registry.iter().filter(matching).cloned());
            } else if let Some(list) = registry.get(&parsed.name) {
                result.extend(list.iter().filter(matching).cloned());
            }
        }
        result
    }

    /// Number of records [`listeners_for`](Self::listeners_for) would return.
    pub fn listener_count(&self, event: impl Into<EventSpecifier>) -> usize {
        self.listeners_for(event).len()
    }

    /// Names of events that currently have listeners, in registration order.
    pub fn event_names(&self) -> Vec<String> {
        self.events
            .read()
            .map(|registry| registry.names())
            .unwrap_or_default()
    }

    /// Returns true if no listener is registered on any event.
    pub fn is_empty(&self) -> bool {
        self.events
            .read()
            .map(|registry| registry.is_empty())
            .unwrap_or(true)
    }
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("config", &self.config)
            .field("events", &self.event_names())
            .finish()
    }
}
