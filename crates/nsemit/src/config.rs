//! Emitter configuration.
//!
//! Configuration comes from defaults, a JSON file, or the environment:
//!
//! - `NSEMIT_DISPATCH`: `snapshot` (default) or `live`
//! - `NSEMIT_MAX_LISTENERS`: per-event listener count that triggers a warning

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EmitterError, Result};

/// Environment variable selecting the dispatch mode.
pub const DISPATCH_ENV: &str = "NSEMIT_DISPATCH";

/// Environment variable setting the per-event listener warning threshold.
pub const MAX_LISTENERS_ENV: &str = "NSEMIT_MAX_LISTENERS";

/// How `emit` walks an event's listeners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Matching records are copied when `emit` starts. Listeners removed
    /// during dispatch still fire in that round; listeners added during
    /// dispatch wait for the next emission. A once-listener leaves the
    /// registry as it fires, so a nested emit never runs it again.
    #[default]
    Snapshot,
    /// Dispatch indexes into the live listener list, re-reading each slot.
    /// Mutation during dispatch can skip a listener or fire one twice.
    Live,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot => f.write_str("snapshot"),
            Self::Live => f.write_str("live"),
        }
    }
}

impl FromStr for DispatchMode {
    type Err = EmitterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snapshot" => Ok(Self::Snapshot),
            "live" => Ok(Self::Live),
            other => Err(EmitterError::Config(format!(
                "unknown dispatch mode `{}` (expected `snapshot` or `live`)",
                other
            ))),
        }
    }
}

/// Settings for one [`Emitter`](crate::Emitter).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub dispatch: DispatchMode,
    /// Warn when a single event holds more than this many listeners.
    pub max_listeners: Option<usize>,
}

impl EmitterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the dispatch mode.
    pub fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Sets the listener warning threshold.
    pub fn with_max_listeners(mut self, max: usize) -> Self {
        self.max_listeners = Some(max);
        self
    }

    /// Reads settings from the environment, falling back to defaults for
    /// unset variables.
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Overrides fields that are set in the environment.
    pub fn merge_env(mut self) -> Result<Self> {
        if let Ok(value) = std::env::var(DISPATCH_ENV) {
            self.dispatch = value.parse()?;
        }
        if let Ok(value) = std::env::var(MAX_LISTENERS_ENV) {
            let max = value.trim().parse::<usize>().map_err(|e| {
                EmitterError::Config(format!("{}={}: {}", MAX_LISTENERS_ENV, value, e))
            })?;
            self.max_listeners = Some(max);
        }
        Ok(self)
    }

    /// Loads settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EmitterError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| EmitterError::Config(format!("{}: {}", path.display(), e)))
    }
}
