//! CLI command handling
//!
//! Dispatches CLI commands and formats output.

use std::path::PathBuf;

use colored::Colorize;
use prost_reflect::MethodDescriptor;

use crate::commands::Commands;
use crate::common::config::{Config, ConnectionConfig};
use crate::common::{Error, Result};
use crate::grpc::descriptor::{load_descriptor, resolve_service};
use crate::testing::{run_scenarios, TestResult};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            scenarios,
            config,
            fixtures,
            verbose,
        } => {
            let mut config = Config::load(config.as_deref())?;
            if fixtures.is_some() {
                config.fixtures.directory = fixtures;
            }

            let results = run_scenarios(&scenarios, &config, verbose).await?;
            print_summary(&results);

            let failed = results.iter().filter(|r| !r.passed).count();
            if failed > 0 {
                return Err(Error::TestAssertion(format!(
                    "{} of {} scenarios failed",
                    failed,
                    results.len()
                )));
            }
            Ok(())
        }

        Commands::Methods {
            config,
            proto,
            service,
        } => {
            let config = Config::load(config.as_deref())?;
            let connection = config.connection.merged(&ConnectionConfig {
                proto,
                service,
                ..Default::default()
            });

            let proto: PathBuf = connection
                .proto
                .ok_or_else(|| Error::Config("no proto given; use --proto".to_string()))?;
            let service = connection
                .service
                .ok_or_else(|| Error::Config("no service given; use --service".to_string()))?;

            let pool = load_descriptor(&proto, &config.loader)?;
            let service = resolve_service(&pool, &service)?;

            println!("{}", service.full_name().bold());
            for method in service.methods() {
                print_method(&method);
            }
            Ok(())
        }
    }
}

fn print_method(method: &MethodDescriptor) {
    let stream = |streaming: bool| if streaming { "stream " } else { "" };
    let note = if method.is_client_streaming() || method.is_server_streaming() {
        " (not callable)".dimmed().to_string()
    } else {
        String::new()
    };
    println!(
        "  {}({}{}) returns ({}{}){}",
        method.name(),
        stream(method.is_client_streaming()),
        method.input().full_name(),
        stream(method.is_server_streaming()),
        method.output().full_name(),
        note
    );
}

fn print_summary(results: &[TestResult]) {
    let passed = results.iter().filter(|r| r.passed).count();
    println!("{}", "Summary:".cyan());
    for result in results {
        let mark = if result.passed {
            "✓".green()
        } else {
            "✗".red()
        };
        println!(
            "  {} {} ({} steps, {} failed)",
            mark,
            result.name,
            result.steps_total,
            result.failures.len()
        );
    }
    println!("{} passed, {} failed", passed, results.len() - passed);
}
