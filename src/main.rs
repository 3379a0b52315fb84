use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use map2bbc::cli::Cli;

fn main() {
    init_tracing();

    let args = Cli::parse();
    if let Err(err) = map2bbc::run(&args) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
