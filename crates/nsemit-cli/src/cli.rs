//! Command-line interface definition using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nsemit::{DispatchMode, EmitterConfig};

use crate::error::Result;

/// nsemit - drive a namespaced event emitter from scripts or a REPL
#[derive(Parser, Debug)]
#[command(name = "nsemit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON emitter configuration file
    #[arg(short, long, env = "NSEMIT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Dispatch mode (snapshot or live); overrides the configuration
    #[arg(long, global = true)]
    pub dispatch: Option<DispatchMode>,

    /// Warn when one event holds more than this many listeners
    #[arg(long, global = true)]
    pub max_listeners: Option<usize>,

    /// Print listener listings as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a script, one command per line
    Run {
        /// Path to the script
        #[arg(required = true)]
        script: PathBuf,
    },

    /// Start interactive REPL mode
    Repl,
}

impl Cli {
    /// Resolves the emitter configuration.
    ///
    /// A configuration file replaces the environment settings. Flags
    /// override both.
    pub fn emitter_config(&self) -> Result<EmitterConfig> {
        let mut config = match &self.config {
            Some(path) => EmitterConfig::load(path)?,
            None => EmitterConfig::from_env()?,
        };
        if let Some(dispatch) = self.dispatch {
            config.dispatch = dispatch;
        }
        if let Some(max) = self.max_listeners {
            config.max_listeners = Some(max);
        }
        Ok(config)
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
