//! Emitter capability for composing types.
//!
//! A type that owns an [`Emitter`] implements [`EventHost`] by exposing it;
//! the trait then forwards the emitter operations and returns the host
//! itself, so calls chain on the host type.
//!
//! ```
//! use nsemit::{Emitter, EventHost, Listener};
//!
//! struct Door {
//!     events: Emitter<bool>,
//! }
//!
//! impl EventHost<bool> for Door {
//!     fn emitter(&self) -> &Emitter<bool> {
//!         &self.events
//!     }
//! }
//!
//! let door = Door { events: Emitter::new() };
//! door.on("toggle", Listener::from_fn(|_| {}))?.emit("toggle", &[true])?;
//! # Ok::<(), nsemit::EmitterError>(())
//! ```

use crate::emitter::Emitter;
use crate::error::Result;
use crate::event::EventSpecifier;
use crate::listener::{Binding, ListenerRecord};

/// A type that gains emitter operations by owning an [`Emitter`].
///
/// Each host owns its own registry; nothing is shared between hosts.
pub trait EventHost<T> {
    /// The emitter this host delegates to.
    fn emitter(&self) -> &Emitter<T>;

    fn on(&self, event: impl Into<EventSpecifier>, listener: impl Into<Binding<T>>) -> Result<&Self> {
        self.emitter().on(event, listener)?;
        Ok(self)
    }

    fn once(&self, event: impl Into<EventSpecifier>, listener: impl Into<Binding<T>>) -> Result<&Self> {
        self.emitter().once(event, listener)?;
        Ok(self)
    }

    fn on_each<I, B>(&self, event: impl Into<EventSpecifier>, listeners: I) -> Result<&Self>
    where
        I: IntoIterator<Item = B>,
        B: Into<Binding<T>>,
    {
        self.emitter().on_each(event, listeners)?;
        Ok(self)
    }

    fn once_each<I, B>(&self, event: impl Into<EventSpecifier>, listeners: I) -> Result<&Self>
    where
        I: IntoIterator<Item = B>,
        B: Into<Binding<T>>,
    {
        self.emitter().once_each(event, listeners)?;
        Ok(self)
    }

    fn off(&self, event: impl Into<EventSpecifier>) -> Result<&Self> {
        self.emitter().off(event)?;
        Ok(self)
    }

    fn off_listener(
        &self,
        event: impl Into<EventSpecifier>,
        listener: impl Into<Binding<T>>,
    ) -> Result<&Self> {
        self.emitter().off_listener(event, listener)?;
        Ok(self)
    }

    fn off_listeners<I, B>(&self, event: impl Into<EventSpecifier>, listeners: I) -> Result<&Self>
    where
        I: IntoIterator<Item = B>,
        B: Into<Binding<T>>,
    {
        self.emitter().off_listeners(event, listeners)?;
        Ok(self)
    }

    fn off_all(&self) -> Result<&Self> {
        self.emitter().off_all()?;
        Ok(self)
    }

    fn emit(&self, event: impl Into<EventSpecifier>, args: &[T]) -> Result<&Self> {
        self.emitter().emit(event, args)?;
        Ok(self)
    }

    fn listeners(&self) -> Vec<ListenerRecord<T>> {
        self.emitter().listeners()
    }

    fn listeners_for(&self, event: impl Into<EventSpecifier>) -> Vec<ListenerRecord<T>> {
        self.emitter().listeners_for(event)
    }

    fn listener_count(&self, event: impl Into<EventSpecifier>) -> usize {
        self.emitter().listener_count(event)
    }
}
