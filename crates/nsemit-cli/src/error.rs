//! Error types for the CLI.

use nsemit::EmitterError;
use thiserror::Error;

/// Errors raised while reading or executing emitter commands.
#[derive(Error, Debug)]
pub enum CliError {
    /// A script or REPL line could not be parsed.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Emitter operation failed.
    #[error(transparent)]
    Emitter(#[from] EmitterError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Line editor failure.
    #[error("readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    /// JSON encoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
