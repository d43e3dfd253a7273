//! Script execution.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::command::Command;
use crate::error::Result;
use crate::session::Session;

/// Executes every line of `script`, writing output to `out`.
///
/// Stops at the first parse or listener error, or at `quit`.
pub fn run_script<W: Write>(session: &mut Session, script: &str, out: &mut W) -> Result<()> {
    for (index, line) in script.lines().enumerate() {
        let command = Command::parse(line, index + 1)?;
        let outcome = session.execute(command)?;
        for printed in &outcome.lines {
            writeln!(out, "{}", printed)?;
        }
        if outcome.quit {
            break;
        }
    }
    Ok(())
}

/// Reads and executes the script at `path`.
pub fn run_file<W: Write>(session: &mut Session, path: &Path, out: &mut W) -> Result<()> {
    let script = std::fs::read_to_string(path)?;
    info!(path = %path.display(), "running script");
    run_script(session, &script, out)
}
