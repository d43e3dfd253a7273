//! Parsing of one-line emitter commands.
//!
//! ```text
//! on <events> <label>...       register printing listeners
//! once <events> <label>...     same, removed after first call
//! off                          remove everything
//! off <events>                 remove by event / namespace
//! off <events> <label>...      remove specific listeners
//! emit <events> [arg]...       emit with string arguments
//! listeners [events]...        list registered records
//! ```
//!
//! `<events>` is one event string or a comma-separated list
//! (`save.ui,load`). A label may carry a receiver as `label@receiver`.

use nsemit::EventSpecifier;

use crate::error::{CliError, Result};

/// A listener reference: label plus optional named receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRef {
    pub label: String,
    pub receiver: Option<String>,
}

impl LabelRef {
    fn parse(token: &str) -> Self {
        match token.split_once('@') {
            Some((label, receiver)) => Self {
                label: label.to_string(),
                receiver: Some(receiver.to_string()),
            },
            None => Self {
                label: token.to_string(),
                receiver: None,
            },
        }
    }
}

/// Parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    On {
        events: EventSpecifier,
        labels: Vec<LabelRef>,
        once: bool,
    },
    Off {
        events: Option<EventSpecifier>,
        labels: Vec<LabelRef>,
    },
    Emit {
        events: EventSpecifier,
        args: Vec<String>,
    },
    Listeners {
        events: Vec<String>,
    },
    Help,
    Quit,
    /// Blank line or comment.
    Nothing,
}

/// Splits a comma-separated event list into a specifier.
fn parse_events(token: &str) -> EventSpecifier {
    if token.contains(',') {
        EventSpecifier::Many(token.split(',').map(String::from).collect())
    } else {
        EventSpecifier::One(token.to_string())
    }
}

impl Command {
    /// Parses `input`; `line` is used in error messages.
    pub fn parse(input: &str, line: usize) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() || input.starts_with('#') {
            return Ok(Command::Nothing);
        }

        let mut parts = input.split_whitespace();
        let verb = parts.next().unwrap_or_default().to_lowercase();
        let rest: Vec<&str> = parts.collect();
        let error = |message: &str| CliError::Parse {
            line,
            message: message.to_string(),
        };

        match verb.as_str() {
            "on" | "once" => {
                let (events, labels) = rest
                    .split_first()
                    .ok_or_else(|| error("usage: on <events> <label>..."))?;
                if labels.is_empty() {
                    return Err(error("at least one listener label is required"));
                }
                Ok(Command::On {
                    events: parse_events(events),
                    labels: labels.iter().map(|t| LabelRef::parse(t)).collect(),
                    once: verb == "once",
                })
            }
            "off" => Ok(match rest.split_first() {
                None => Command::Off {
                    events: None,
                    labels: Vec::new(),
                },
                Some((events, labels)) => Command::Off {
                    events: Some(parse_events(events)),
                    labels: labels.iter().map(|t| LabelRef::parse(t)).collect(),
                },
            }),
            "emit" => {
                let (events, args) = rest
                    .split_first()
                    .ok_or_else(|| error("usage: emit <events> [arg]..."))?;
                Ok(Command::Emit {
                    events: parse_events(events),
                    args: args.iter().map(|a| a.to_string()).collect(),
                })
            }
            "listeners" | "ls" => Ok(Command::Listeners {
                events: rest.iter().map(|e| e.to_string()).collect(),
            }),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(error(&format!("unknown command `{}`", other))),
        }
    }
}

/// Help text shown by `help`.
pub const HELP: &str = "\
on <events> <label>...     register listeners (label or label@receiver)
once <events> <label>...   register listeners that fire once
off                        remove every listener
off <events>               remove by event or namespace (e.g. `.ui`)
off <events> <label>...    remove specific listeners
emit <events> [arg]...     emit with arguments
listeners [events]...      list registered listeners
quit                       leave

<events> is `name`, `name.ns1.ns2`, `.ns` or a comma-separated list.";
