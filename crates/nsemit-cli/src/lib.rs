//! nsemit CLI library.
//!
//! Drives one [`nsemit::Emitter`] through textual commands, either from a
//! script file or an interactive REPL.

pub mod cli;
pub mod command;
pub mod error;
pub mod repl;
pub mod runner;
pub mod session;

pub use command::Command;
pub use error::{CliError, Result};
pub use session::{Outcome, Session};
