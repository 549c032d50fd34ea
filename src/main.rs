//! grpc-bdd - behaviour-driven tests for gRPC services
//!
//! Runs YAML scenarios against a live service, calling its methods through
//! descriptors loaded at runtime.

use clap::Parser;
use grpc_bdd::common::logging;
use grpc_bdd::{cli, commands::Commands};

#[derive(Parser)]
#[command(name = "grpc-bdd", about = "Behaviour-driven tests for gRPC services")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.command.verbose());

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
