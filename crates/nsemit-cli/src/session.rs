//! A single emitter driven by textual commands.
//!
//! Listener labels map to printing listeners created on first use, so a
//! label names the same listener identity for its whole session. Receiver
//! names (`label@panel`) work the same way.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use nsemit::{
    Binding, Context, Emitter, EmitterConfig, EventSpecifier, Listener, ListenerRecord, Payload,
};
use tracing::debug;

use crate::command::{Command, LabelRef, HELP};
use crate::error::Result;

/// Output lines produced by listeners during one command.
type Sink = Arc<Mutex<Vec<String>>>;

/// Outcome of executing one command.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Lines to print, in order.
    pub lines: Vec<String>,
    /// True when the command asked to leave.
    pub quit: bool,
}

pub struct Session {
    emitter: Emitter<String>,
    listeners: HashMap<String, Listener<String>>,
    receivers: HashMap<String, Context>,
    sink: Sink,
    json: bool,
}

impl Session {
    pub fn new(config: EmitterConfig, json: bool) -> Self {
        Self {
            emitter: Emitter::with_config(config),
            listeners: HashMap::new(),
            receivers: HashMap::new(),
            sink: Arc::new(Mutex::new(Vec::new())),
            json,
        }
    }

    pub fn emitter(&self) -> &Emitter<String> {
        &self.emitter
    }

    /// Runs one command and collects what it printed.
    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        debug!(?command, "executing command");
        let mut outcome = Outcome::default();

        let result = self.apply(command, &mut outcome);
        // Listener output comes first even when a later listener failed.
        let mut printed = self.drain();
        printed.append(&mut outcome.lines);
        outcome.lines = printed;
        result.map(|_| outcome)
    }

    fn apply(&mut self, command: Command, outcome: &mut Outcome) -> Result<()> {
        match command {
            Command::On {
                events,
                labels,
                once,
            } => {
                let bindings = self.bindings(&labels);
                if once {
                    self.emitter.once_each(events, bindings)?;
                } else {
                    self.emitter.on_each(events, bindings)?;
                }
            }
            Command::Off { events: None, .. } => {
                self.emitter.off_all()?;
            }
            Command::Off {
                events: Some(events),
                labels,
            } => {
                if labels.is_empty() {
                    self.emitter.off(events)?;
                } else {
                    let bindings = self.bindings(&labels);
                    self.emitter.off_listeners(events, bindings)?;
                }
            }
            Command::Emit { events, args } => {
                self.emitter.emit(events, &args)?;
            }
            Command::Listeners { events } => {
                let records = if events.is_empty() {
                    self.emitter.listeners()
                } else {
                    self.emitter.listeners_for(EventSpecifier::Many(events))
                };
                for record in &records {
                    outcome.lines.push(self.describe(record)?);
                }
            }
            Command::Help => outcome.lines.extend(HELP.lines().map(String::from)),
            Command::Quit => outcome.quit = true,
            Command::Nothing => {}
        }
        Ok(())
    }

    fn bindings(&mut self, labels: &[LabelRef]) -> Vec<Binding<String>> {
        labels
            .iter()
            .map(|label| {
                let listener = self.listener(&label.label);
                match &label.receiver {
                    Some(name) => Binding::new(listener, self.receiver(name)),
                    None => Binding::from(listener),
                }
            })
            .collect()
    }

    fn listener(&mut self, label: &str) -> Listener<String> {
        let sink = Arc::clone(&self.sink);
        self.listeners
            .entry(label.to_string())
            .or_insert_with(|| printing_listener(label.to_string(), sink))
            .clone()
    }

    fn receiver(&mut self, name: &str) -> Context {
        self.receivers
            .entry(name.to_string())
            .or_insert_with(|| Context::new(name.to_string()))
            .clone()
    }

    fn describe(&self, record: &ListenerRecord<String>) -> Result<String> {
        if self.json {
            return Ok(serde_json::to_string(&record.info())?);
        }
        let label = self
            .listeners
            .iter()
            .find(|(_, listener)| listener.same(record.listener()))
            .map(|(label, _)| label.as_str())
            .unwrap_or("?");
        let mut line = format!("{} {} {}", record.id(), record.event(), label);
        if let Some(receiver) = record.context().downcast_ref::<String>() {
            line.push('@');
            line.push_str(receiver);
        }
        if !record.namespaces().is_empty() {
            line.push_str(&format!(" [{}]", record.namespaces().join(".")));
        }
        if record.is_once() {
            line.push_str(" once");
        }
        Ok(line)
    }

    fn drain(&self) -> Vec<String> {
        match self.sink.lock() {
            Ok(mut lines) => std::mem::take(&mut *lines),
            Err(_) => Vec::new(),
        }
    }
}

/// Listener that writes one line per call into `sink`.
fn printing_listener(label: String, sink: Sink) -> Listener<String> {
    Listener::new(move |ctx: &Context, payload: &Payload<'_, String>| {
        let who = match ctx.downcast_ref::<String>() {
            Some(receiver) => format!("{}@{}", label, receiver),
            None => label.clone(),
        };
        let line = match payload {
            Payload::Args(args) => format!("{} <- {}", who, args.join(" ")),
            Payload::NewListener { event, record } => {
                format!("{} <- newListener {} {}", who, event, record.id())
            }
            Payload::RemoveListener { event, record } => {
                format!("{} <- removeListener {} {}", who, event, record.id())
            }
        };
        if let Ok(mut lines) = sink.lock() {
            lines.push(line.trim_end().to_string());
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsemit::DispatchMode;

    fn run(session: &mut Session, input: &str) -> Vec<String> {
        let command = Command::parse(input, 1).unwrap();
        session.execute(command).unwrap().lines
    }

    #[test]
    fn test_namespaced_emit() {
        let mut session = Session::new(EmitterConfig::default(), false);
        run(&mut session, "on x.ns1 a");
        run(&mut session, "on x.ns2 b");

        assert_eq!(run(&mut session, "emit x.ns1 hi"), vec!["a <- hi"]);
        assert_eq!(run(&mut session, "emit x"), vec!["a <-", "b <-"]);
    }

    #[test]
    fn test_label_keeps_identity_for_off() {
        let mut session = Session::new(EmitterConfig::default(), false);
        run(&mut session, "on e a b");
        run(&mut session, "off e a");

        assert_eq!(run(&mut session, "emit e"), vec!["b <-"]);
    }

    #[test]
    fn test_receiver_printed_and_matched() {
        let mut session = Session::new(EmitterConfig::default(), false);
        run(&mut session, "on e a@panel a");
        assert_eq!(run(&mut session, "emit e 1"), vec!["a@panel <- 1", "a <- 1"]);

        run(&mut session, "off e a@panel");
        assert_eq!(run(&mut session, "emit e 2"), vec!["a <- 2"]);
    }

    #[test]
    fn test_lifecycle_output() {
        let mut session = Session::new(EmitterConfig::default(), false);
        run(&mut session, "on newListener watch");
        let lines = run(&mut session, "on save a");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("watch <- newListener save #"));
    }

    #[test]
    fn test_listeners_listing() {
        let mut session = Session::new(EmitterConfig::default(), false);
        run(&mut session, "once save.ui a@panel");
        let lines = run(&mut session, "listeners save");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("save a@panel [ui] once"), "{}", lines[0]);
    }

    #[test]
    fn test_listeners_json() {
        let mut session = Session::new(EmitterConfig::default(), true);
        run(&mut session, "on save.ui a");
        let lines = run(&mut session, "ls");
        let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(value["event"], "save");
        assert_eq!(value["namespaces"][0], "ui");
    }

    #[test]
    fn test_off_all_and_quit() {
        let mut session = Session::new(
            EmitterConfig::default().with_dispatch(DispatchMode::Live),
            false,
        );
        run(&mut session, "on a,b x");
        run(&mut session, "off");
        assert!(session.emitter().is_empty());

        let outcome = session.execute(Command::Quit).unwrap();
        assert!(outcome.quit);
    }

    #[test]
    fn test_help_lists_commands() {
        let mut session = Session::new(EmitterConfig::default(), false);
        let lines = run(&mut session, "help");
        assert!(lines.iter().any(|l| l.starts_with("emit")));
    }
}
