use clap::Parser;
use tracing_subscriber::EnvFilter;

use fire_scenario::cli::{self, Cli};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = cli::run(Cli::parse()).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
