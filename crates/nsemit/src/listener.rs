//! Listener handles, receivers and the stored listener record.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ListenerError;

/// Closure type for listener callbacks.
pub type Callback<T> =
    dyn Fn(&Context, &Payload<'_, T>) -> Result<(), ListenerError> + Send + Sync;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier assigned to every stored listener record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Receiver a callback is invoked with.
///
/// Two contexts are the same receiver when both are ambient or both point at
/// the same allocation.
#[derive(Clone, Default)]
pub enum Context {
    #[default]
    Ambient,
    Object(Arc<dyn Any + Send + Sync>),
}

impl Context {
    /// Wraps `value` in a fresh receiver.
    pub fn new<C: Any + Send + Sync>(value: C) -> Self {
        Self::Object(Arc::new(value))
    }

    /// Uses an existing shared value as the receiver, keeping its identity.
    pub fn from_arc<C: Any + Send + Sync>(value: Arc<C>) -> Self {
        Self::Object(value)
    }

    /// Typed view of the receiver.
    pub fn downcast_ref<C: Any>(&self) -> Option<&C> {
        match self {
            Self::Ambient => None,
            Self::Object(value) => value.downcast_ref::<C>(),
        }
    }

    pub fn is_ambient(&self) -> bool {
        matches!(self, Self::Ambient)
    }

    /// Identity comparison.
    pub fn same(&self, other: &Context) -> bool {
        match (self, other) {
            (Self::Ambient, Self::Ambient) => true,
            (Self::Object(a), Self::Object(b)) => {
                std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
            }
            _ => false,
        }
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ambient => f.write_str("Ambient"),
            Self::Object(value) => write!(f, "Object({:p})", Arc::as_ptr(value) as *const ()),
        }
    }
}

/// What a callback receives for one emission.
pub enum Payload<'a, T> {
    /// Arguments forwarded verbatim from `emit`.
    Args(&'a [T]),
    /// A record was just registered under `event`.
    NewListener {
        event: &'a str,
        record: &'a ListenerRecord<T>,
    },
    /// A record registered under `event` is about to be removed.
    RemoveListener {
        event: &'a str,
        record: &'a ListenerRecord<T>,
    },
}

impl<'a, T> Payload<'a, T> {
    /// Forwarded arguments; empty for lifecycle notifications.
    pub fn args(&self) -> &'a [T] {
        match *self {
            Self::Args(args) => args,
            _ => &[],
        }
    }

    /// The record a lifecycle notification is about.
    pub fn record(&self) -> Option<&'a ListenerRecord<T>> {
        match *self {
            Self::Args(_) => None,
            Self::NewListener { record, .. } | Self::RemoveListener { record, .. } => Some(record),
        }
    }

    /// The event a lifecycle notification is about.
    pub fn subject(&self) -> Option<&'a str> {
        match *self {
            Self::Args(_) => None,
            Self::NewListener { event, .. } | Self::RemoveListener { event, .. } => Some(event),
        }
    }
}

impl<T> Clone for Payload<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Payload<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Payload<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Args(args) => f.debug_tuple("Args").field(args).finish(),
            Self::NewListener { event, record } => f
                .debug_struct("NewListener")
                .field("event", event)
                .field("record", record)
                .finish(),
            Self::RemoveListener { event, record } => f
                .debug_struct("RemoveListener")
                .field("event", event)
                .field("record", record)
                .finish(),
        }
    }
}

/// Shared handle to a callback.
///
/// Clones are the same listener: identity is the shared callback, which is
/// what `off` compares against.
pub struct Listener<T> {
    callback: Arc<Callback<T>>,
    bound: Option<Context>,
}

impl<T> Listener<T> {
    /// Creates a listener from a fallible callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Context, &Payload<'_, T>) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
            bound: None,
        }
    }

    /// Creates a listener that ignores its receiver and never fails.
    pub fn from_fn<F>(callback: F) -> Self
    where
        F: Fn(&Payload<'_, T>) + Send + Sync + 'static,
    {
        Self::new(move |_, payload| {
            callback(payload);
            Ok(())
        })
    }

    /// Returns a new listener permanently bound to `context`.
    ///
    /// The bound receiver wins over any context supplied at registration.
    /// The result has its own identity, distinct from `self`.
    pub fn bind(&self, context: Context) -> Self
    where
        T: 'static,
    {
        let inner = Arc::clone(&self.callback);
        Self {
            callback: Arc::new(move |ctx: &Context, payload: &Payload<'_, T>| inner(ctx, payload)),
            bound: Some(context),
        }
    }

    pub fn bound_context(&self) -> Option<&Context> {
        self.bound.as_ref()
    }

    /// Identity comparison.
    pub fn same(&self, other: &Listener<T>) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.callback) as *const (),
            Arc::as_ptr(&other.callback) as *const (),
        )
    }

    pub(crate) fn call(&self, context: &Context, payload: &Payload<'_, T>) -> Result<(), ListenerError> {
        (self.callback)(context, payload)
    }
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
            bound: self.bound.clone(),
        }
    }
}

impl<T> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("callback", &(Arc::as_ptr(&self.callback) as *const ()))
            .field("bound", &self.bound)
            .finish()
    }
}

/// A listener as passed to `on`/`off`: bare, or paired with a receiver.
#[derive(Debug)]
pub struct Binding<T> {
    pub listener: Listener<T>,
    pub context: Option<Context>,
}

impl<T> Binding<T> {
    pub fn new(listener: Listener<T>, context: Context) -> Self {
        Self {
            listener,
            context: Some(context),
        }
    }

    /// Receiver a record created from this binding is invoked with.
    fn effective_context(&self) -> Context {
        self.listener
            .bound_context()
            .or(self.context.as_ref())
            .cloned()
            .unwrap_or_default()
    }
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            listener: self.listener.clone(),
            context: self.context.clone(),
        }
    }
}

impl<T> From<Listener<T>> for Binding<T> {
    fn from(listener: Listener<T>) -> Self {
        Self {
            listener,
            context: None,
        }
    }
}

impl<T> From<&Listener<T>> for Binding<T> {
    fn from(listener: &Listener<T>) -> Self {
        Self::from(listener.clone())
    }
}

impl<T> From<(Listener<T>, Context)> for Binding<T> {
    fn from((listener, context): (Listener<T>, Context)) -> Self {
        Self::new(listener, context)
    }
}

impl<T> From<(&Listener<T>, Context)> for Binding<T> {
    fn from((listener, context): (&Listener<T>, Context)) -> Self {
        Self::new(listener.clone(), context)
    }
}

/// One registered callback.
pub struct ListenerRecord<T> {
    id: ListenerId,
    event: String,
    listener: Listener<T>,
    context: Context,
    namespaces: Vec<String>,
    once: bool,
}

impl<T> ListenerRecord<T> {
    pub(crate) fn new(event: &str, binding: Binding<T>, namespaces: Vec<String>, once: bool) -> Self {
        let context = binding.effective_context();
        Self {
            id: ListenerId::next(),
            event: event.to_string(),
            listener: binding.listener,
            context,
            namespaces,
            once,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Event name the record is stored under.
    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn listener(&self) -> &Listener<T> {
        &self.listener
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn is_once(&self) -> bool {
        self.once
    }

    /// Returns true if this record was registered from `binding`.
    ///
    /// A bare listener matches regardless of receiver; a listener paired with
    /// a receiver requires both to match.
    pub fn is_bound_to(&self, binding: &Binding<T>) -> bool {
        if !self.listener.same(&binding.listener) {
            return false;
        }
        match &binding.context {
            Some(context) => self.context.same(context),
            None => true,
        }
    }

    /// Serializable description of this record.
    pub fn info(&self) -> ListenerInfo {
        ListenerInfo {
            id: self.id,
            event: self.event.clone(),
            namespaces: self.namespaces.clone(),
            once: self.once,
            ambient: self.context.is_ambient(),
        }
    }

    pub(crate) fn invoke(&self, payload: &Payload<'_, T>) -> Result<(), ListenerError> {
        self.listener.call(&self.context, payload)
    }
}

impl<T> Clone for ListenerRecord<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            event: self.event.clone(),
            listener: self.listener.clone(),
            context: self.context.clone(),
            namespaces: self.namespaces.clone(),
            once: self.once,
        }
    }
}

impl<T> fmt::Debug for ListenerRecord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRecord")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("namespaces", &self.namespaces)
            .field("once", &self.once)
            .field("context", &self.context)
            .finish()
    }
}

/// Plain-data view of a [`ListenerRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerInfo {
    pub id: ListenerId,
    pub event: String,
    pub namespaces: Vec<String>,
    pub once: bool,
    /// True when the record runs with the ambient receiver.
    pub ambient: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Listener<i32> {
        Listener::from_fn(|_| {})
    }

    #[test]
    fn test_clones_share_identity() {
        let a = noop();
        let b = a.clone();
        let c = noop();
        assert!(a.same(&b));
        assert!(!a.same(&c));
    }

    #[test]
    fn test_bind_creates_new_identity() {
        let a = noop();
        let bound = a.bind(Context::new(5u8));
        assert!(!a.same(&bound));
        assert_eq!(bound.bound_context().and_then(|c| c.downcast_ref::<u8>()), Some(&5));
    }

    #[test]
    fn test_bound_context_wins_over_registration_context() {
        let bound_ctx = Context::new("bound");
        let listener = noop().bind(bound_ctx.clone());
        let record = ListenerRecord::new(
            "e",
            Binding::new(listener, Context::new("passed")),
            Vec::new(),
            false,
        );
        assert!(record.context().same(&bound_ctx));
    }

    #[test]
    fn test_missing_context_defaults_to_ambient() {
        let record = ListenerRecord::new("e", Binding::from(noop()), Vec::new(), false);
        assert!(record.context().is_ambient());
        assert!(record.info().ambient);
    }

    #[test]
    fn test_context_identity() {
        let shared = Arc::new(7u32);
        let a = Context::from_arc(Arc::clone(&shared));
        let b = Context::from_arc(shared);
        assert!(a.same(&b));
        assert!(!a.same(&Context::new(7u32)));
        assert!(Context::Ambient.same(&Context::default()));
        assert!(!a.same(&Context::Ambient));
    }

    #[test]
    fn test_is_bound_to_requires_context_when_given() {
        let listener = noop();
        let ctx = Context::new(1u8);
        let record = ListenerRecord::new(
            "e",
            Binding::new(listener.clone(), ctx.clone()),
            Vec::new(),
            false,
        );

        assert!(record.is_bound_to(&Binding::from(&listener)));
        assert!(record.is_bound_to(&Binding::new(listener.clone(), ctx)));
        assert!(!record.is_bound_to(&Binding::new(listener, Context::new(1u8))));
        assert!(!record.is_bound_to(&Binding::from(noop())));
    }

    #[test]
    fn test_record_ids_are_unique() {
        let a = ListenerRecord::new("e", Binding::from(noop()), Vec::new(), false);
        let b = ListenerRecord::new("e", Binding::from(noop()), Vec::new(), false);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn test_payload_accessors() {
        let record = ListenerRecord::new("save", Binding::from(noop()), vec!["ui".into()], true);
        let args = [1, 2];
        let plain: Payload<'_, i32> = Payload::Args(&args);
        assert_eq!(plain.args(), &[1, 2]);
        assert!(plain.record().is_none());

        let lifecycle = Payload::NewListener {
            event: "save",
            record: &record,
        };
        assert!(lifecycle.args().is_empty());
        assert_eq!(lifecycle.subject(), Some("save"));
        assert_eq!(lifecycle.record().map(|r| r.id()), Some(record.id()));
    }

    #[test]
    fn test_info_serializes() {
        let record = ListenerRecord::new("save", Binding::from(noop()), vec!["ui".into()], true);
        let json = serde_json::to_value(record.info()).unwrap();
        assert_eq!(json["event"], "save");
        assert_eq!(json["namespaces"][0], "ui");
        assert_eq!(json["once"], true);
        assert_eq!(json["id"], record.id().as_u64());
    }
}
