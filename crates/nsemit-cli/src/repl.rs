//! Interactive REPL.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use crate::command::Command;
use crate::error::Result;
use crate::session::Session;

pub struct Repl {
    editor: DefaultEditor,
    session: Session,
    line: usize,
}

impl Repl {
    pub fn new(session: Session) -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
            session,
            line: 0,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        println!("nsemit REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Type help for commands, quit to exit");
        println!();

        loop {
            match self.editor.readline("nsemit> ") {
                Ok(input) => {
                    self.line += 1;
                    self.editor.add_history_entry(input.as_str())?;

                    match self.handle(&input) {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(ReadlineError::Eof) => {
                    println!("^D");
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Handles one input line. Returns Ok(true) if should quit.
    fn handle(&mut self, input: &str) -> Result<bool> {
        let command = Command::parse(input, self.line)?;
        debug!(?command, "parsed command");
        let outcome = self.session.execute(command)?;
        for line in &outcome.lines {
            println!("{}", line);
        }
        Ok(outcome.quit)
    }
}
