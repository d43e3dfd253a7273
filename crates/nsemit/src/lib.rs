//! Synchronous event emitter with dot-delimited namespaces.
//!
//! This crate provides the [`Emitter`], an in-process pub/sub registry:
//! - `on`/`once` register callbacks under an event name, optionally tagged
//!   with namespaces (`"save.user.admin"`)
//! - `emit` runs every matching callback synchronously, in registration order
//! - `off` removes by event, by namespace, or by listener identity
//! - `newListener`/`removeListener` events announce registry changes
//!
//! # Example
//!
//! ```
//! use nsemit::{Emitter, Listener, Payload};
//!
//! let emitter: Emitter<String> = Emitter::new();
//!
//! let greet = Listener::from_fn(|payload: &Payload<'_, String>| {
//!     for name in payload.args() {
//!         println!("hello {name}");
//!     }
//! });
//!
//! emitter
//!     .on(["join.lobby", "join.game"], &greet)?
//!     .emit("join.lobby", &["ada".to_string()])?
//!     .off(".game")?;
//!
//! assert_eq!(emitter.listener_count("join"), 1);
//! # Ok::<(), nsemit::EmitterError>(())
//! ```

pub mod config;
pub mod emitter;
pub mod error;
pub mod event;
pub mod filter;
pub mod host;
pub mod listener;
mod registry;

pub use config::{DispatchMode, EmitterConfig};
pub use emitter::Emitter;
pub use error::{EmitterError, ListenerError, Result};
pub use event::{EventSpecifier, ParsedEvent, NEW_LISTENER, REMOVE_LISTENER};
pub use filter::NamespaceFilter;
pub use host::EventHost;
pub use listener::{Binding, Context, Listener, ListenerId, ListenerInfo, ListenerRecord, Payload};
