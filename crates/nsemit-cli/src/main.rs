//! nsemit CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use nsemit_cli::cli::{Cli, Commands};
use nsemit_cli::repl::Repl;
use nsemit_cli::runner;
use nsemit_cli::{Result, Session};

fn main() {
    // Load .env if present (NSEMIT_DISPATCH etc.)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt().with_env_filter(filter).with_target(false).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let session = Session::new(cli.emitter_config()?, cli.json);

    match cli.command {
        Some(Commands::Run { script }) => {
            let mut session = session;
            let stdout = std::io::stdout();
            runner::run_file(&mut session, &script, &mut stdout.lock())
        }
        Some(Commands::Repl) | None => Repl::new(session)?.run(),
    }
}
