//! Error types for emitter operations.

use thiserror::Error;

/// Error a listener callback returns to abort the current dispatch.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while dispatching or mutating an emitter.
#[derive(Error, Debug)]
pub enum EmitterError {
    /// A listener callback failed; remaining listeners for that emission
    /// were not invoked.
    #[error("listener for `{event}` failed: {source}")]
    Listener {
        event: String,
        #[source]
        source: ListenerError,
    },

    /// Lock poisoned (thread panicked while holding lock).
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// Configuration could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EmitterError {
    /// Name of the event whose listener failed, if this is a listener error.
    pub fn event(&self) -> Option<&str> {
        match self {
            Self::Listener { event, .. } => Some(event),
            _ => None,
        }
    }
}

/// Result type alias for emitter operations.
pub type Result<T> = std::result::Result<T, EmitterError>;
