mod cli;

use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // Parse CLI and dispatch. Logging is set up per run once the input file is known.
    if let Err(err) = Cli::parse().run().await {
        eprintln!("mpu error: {:#}", err);
        std::process::exit(1);
    }
}
