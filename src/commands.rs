//! CLI command definitions
//!
//! Defines the clap commands for the grpc-bdd CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Execute test scenarios defined in YAML files
    Run {
        /// Paths to the YAML scenario files, run in order
        #[arg(required = true)]
        scenarios: Vec<PathBuf>,

        /// Configuration file (default: the user config directory)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Directory fixture files are read from
        #[arg(long)]
        fixtures: Option<PathBuf>,

        /// Show response messages and debug logs
        #[arg(long, short)]
        verbose: bool,
    },

    /// List the methods of a service
    Methods {
        /// Configuration file (default: the user config directory)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Proto source or encoded descriptor set
        #[arg(long)]
        proto: Option<PathBuf>,

        /// Fully-qualified service name
        #[arg(long)]
        service: Option<String>,
    },
}

impl Commands {
    /// Whether debug logging was requested
    pub fn verbose(&self) -> bool {
        matches!(self, Commands::Run { verbose: true, .. })
    }
}
