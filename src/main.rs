use clap::Parser;
use jai::cli::commands::Cli;
use jai::cli::handlers;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `JAI_LOG=jai=debug`
const LOG_ENV: &str = "JAI_LOG";

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
