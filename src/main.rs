//! roci-ordering binary entry point.

use clap::Parser;
use roci_ordering::cli::{self, Cli, Commands};
use roci_ordering::config::OrderingConfig;
use roci_ordering::error::Result;
use roci_ordering::ordering::TracingSink;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}

/// Returns `false` when the command should exit non-zero without an error.
fn run(command: Commands) -> Result<bool> {
    let config = OrderingConfig::from_env()?;
    let mut stdout = std::io::stdout().lock();

    match command {
        Commands::Check(args) => {
            let messages = cli::read_transcript(&args.input)?;
            cli::handle_check(&messages, &args, &config, &mut stdout)
        }
        Commands::Repair(args) => {
            let messages = cli::read_transcript(&args.input)?;
            cli::handle_repair(&messages, &args, &config, &TracingSink, &mut stdout)?;
            Ok(true)
        }
        Commands::Classify(args) => {
            cli::handle_classify(&args, &config, &mut stdout)?;
            Ok(true)
        }
    }
}
