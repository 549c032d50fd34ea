//! Test runner implementation
//!
//! Executes scenario steps against an engine session and reports each
//! step as it completes. A failed step is reported and the remaining
//! steps still run; only fatal errors stop a run.

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::session::{AssertionResult, FixtureDir, FixtureSource, Session};
use crate::variables::GlobalVariables;

use super::config::{Payload, PayloadSource, Scope, TestScenario, TestStep};

/// Result of a test run
#[derive(Debug)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub steps_total: usize,
    /// One entry per failed step
    pub failures: Vec<String>,
}

/// Run several scenario files sharing one global variable scope
///
/// Scenarios run in the order given. A fatal error in one scenario
/// aborts the whole run.
pub async fn run_scenarios(
    paths: &[PathBuf],
    config: &Config,
    verbose: bool,
) -> Result<Vec<TestResult>> {
    let globals = GlobalVariables::new();
    let mut results = Vec::with_capacity(paths.len());
    for path in paths {
        results.push(run_scenario(path, config, &globals, verbose).await?);
    }
    Ok(results)
}

/// Run a test scenario from a YAML file
pub async fn run_scenario(
    path: &Path,
    config: &Config,
    globals: &GlobalVariables,
    verbose: bool,
) -> Result<TestResult> {
    // Load and parse the YAML scenario
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::Config(format!(
            "Failed to read test scenario '{}': {}",
            path.display(),
            e
        ))
    })?;

    let scenario: TestScenario = serde_yaml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse test scenario: {}", e)))?;

    // Paths in the scenario are relative to the scenario file
    let scenario_dir = path.parent().unwrap_or(Path::new("."));
    let target = scenario.target.clone().relative_to(scenario_dir);
    let spec = config.connection.merged(&target).to_spec(&config.loader)?;

    let fixtures = FixtureDir::new(
        config
            .fixtures
            .directory
            .clone()
            .unwrap_or_else(|| scenario_dir.to_path_buf()),
    );

    tracing::info!(scenario = %scenario.name, service = %spec.service, host = %spec.host, "Starting scenario");
    let mut session = Session::connect(&spec, globals.clone())?
        .with_delimiter(config.variables.delimiter.clone());

    execute_scenario(&mut session, &scenario, &fixtures, verbose).await
}

/// Execute every step of `scenario` against `session`
pub async fn execute_scenario(
    session: &mut Session,
    scenario: &TestScenario,
    fixtures: &dyn FixtureSource,
    verbose: bool,
) -> Result<TestResult> {
    let steps_total = scenario.steps.len();

    println!(
        "\n{} {}",
        "Running Test:".blue().bold(),
        scenario.name.white().bold()
    );

    if let Some(desc) = &scenario.description {
        println!("  {}", desc.dimmed());
    }

    println!("\n{}", "Steps:".cyan());

    let mut failures = Vec::new();
    for (i, step) in scenario.steps.iter().enumerate() {
        let step_num = i + 1;

        match execute_step(session, step, fixtures, verbose).await {
            Ok(note) => {
                println!(
                    "  {} Step {}: {}{}",
                    "✓".green(),
                    step_num,
                    step.describe().dimmed(),
                    note.unwrap_or_default().dimmed()
                );
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                println!("  {} Step {}: {}", "✗".red(), step_num, step.describe());
                for line in e.to_string().lines() {
                    println!("      {}", line.red());
                }
                tracing::debug!(step = step_num, error = %e, "Step failed");
                failures.push(format!("Step {}: {}", step_num, e));
            }
        }
    }

    let passed = failures.is_empty();
    if passed {
        println!(
            "\n{} {}\n",
            "✓".green().bold(),
            "Test Passed".green().bold()
        );
    } else {
        println!(
            "\n{} {} ({} of {} steps failed)\n",
            "✗".red().bold(),
            "Test Failed".red().bold(),
            failures.len(),
            steps_total
        );
    }

    Ok(TestResult {
        name: scenario.name.clone(),
        passed,
        steps_total,
        failures,
    })
}

/// Execute a single test step; `Ok` may carry a note for the progress line
async fn execute_step(
    session: &mut Session,
    step: &TestStep,
    fixtures: &dyn FixtureSource,
    verbose: bool,
) -> Result<Option<String>> {
    match step {
        TestStep::Store { name, value, scope } => {
            match scope {
                Scope::Scenario => session.store_value_in_scenario_scope(name, value.clone()),
                Scope::Global => session.store_value_in_global_scope(name, value.clone()),
            }
            Ok(None)
        }
        TestStep::SetRequestMessage(source) => {
            set_payload(session, source, fixtures, PayloadTarget::Message).await?;
            Ok(None)
        }
        TestStep::SetRequestMetadata(source) => {
            set_payload(session, source, fixtures, PayloadTarget::Metadata).await?;
            Ok(None)
        }
        TestStep::Request { rpc, expect_error } => {
            execute_request_step(session, rpc, *expect_error, verbose).await
        }
        TestStep::StoreResponsePath { path, name, scope } => {
            match scope {
                Scope::Scenario => session.store_response_path_in_scenario_scope(path, name)?,
                Scope::Global => session.store_response_path_in_global_scope(path, name)?,
            }
            Ok(None)
        }
        TestStep::AssertDefined { name } => check(session.assert_global_variable_exists(name)),
        TestStep::AssertStatus { status } => check(session.assert_response_status_match(status)),
        TestStep::AssertPath {
            path,
            matches,
            not_matches,
        } => {
            if matches.is_none() && not_matches.is_none() {
                return Err(Error::Config(format!(
                    "assert_path on '{}' needs 'matches' or 'not_matches'",
                    path
                )));
            }
            if let Some(pattern) = matches {
                check(session.assert_path_in_response_message_matches_expression(path, pattern)?)?;
            }
            if let Some(pattern) = not_matches {
                check(
                    session.assert_path_in_response_message_does_not_match_expression(
                        path, pattern,
                    )?,
                )?;
            }
            Ok(None)
        }
        TestStep::AssertArray { path, length } => match length {
            Some(length) => check(session.assert_path_is_array_with_length(path, length)?),
            None => check(session.assert_path_is_array(path)?),
        },
        TestStep::AssertVariable {
            name,
            scope,
            equals,
            not_equals,
        } => {
            if equals.is_none() && not_equals.is_none() {
                return Err(Error::Config(format!(
                    "assert_variable on '{}' needs 'equals' or 'not_equals'",
                    name
                )));
            }
            if let Some(value) = equals {
                check(match scope {
                    Scope::Scenario => session.assert_scenario_variable_value_equal(name, value),
                    Scope::Global => session.assert_global_variable_value_equal(name, value),
                })?;
            }
            if let Some(value) = not_equals {
                check(match scope {
                    Scope::Scenario => session.assert_scenario_variable_value_not_equal(name, value),
                    Scope::Global => session.assert_global_variable_value_not_equal(name, value),
                })?;
            }
            Ok(None)
        }
    }
}

/// Execute a request step
async fn execute_request_step(
    session: &mut Session,
    rpc: &str,
    expect_error: bool,
    verbose: bool,
) -> Result<Option<String>> {
    let result = session.invoke(rpc).await;

    match (result, expect_error) {
        (Ok(()), false) => {
            if verbose {
                return Ok(Some(format!(" -> {}", session.response_message())));
            }
            Ok(None)
        }
        (Err(Error::Invocation { code, .. }), true) => {
            Ok(Some(format!(" ({} as expected)", code)))
        }
        (Ok(()), true) => Err(Error::TestAssertion(format!(
            "Request '{}' expected to fail, but it succeeded",
            rpc
        ))),
        (Err(e), _) => Err(e),
    }
}

#[derive(Debug, Clone, Copy)]
enum PayloadTarget {
    Message,
    Metadata,
}

async fn set_payload(
    session: &mut Session,
    source: &PayloadSource,
    fixtures: &dyn FixtureSource,
    target: PayloadTarget,
) -> Result<()> {
    match (source.resolve()?, target) {
        (Payload::Content(content), PayloadTarget::Message) => {
            session.set_request_message_from_str(&content)
        }
        (Payload::Content(content), PayloadTarget::Metadata) => {
            session.set_request_metadata_from_str(&content)
        }
        (Payload::Table(rows), PayloadTarget::Message) => {
            session.set_request_message_from_table(rows);
            Ok(())
        }
        (Payload::Table(rows), PayloadTarget::Metadata) => {
            session.set_request_metadata_from_table(rows);
            Ok(())
        }
        (Payload::File(file), PayloadTarget::Message) => {
            session.set_request_message_from_file(file, fixtures).await
        }
        (Payload::File(file), PayloadTarget::Metadata) => {
            session.set_request_metadata_from_file(file, fixtures).await
        }
    }
}

/// Turn an assertion mismatch into a step failure
fn check(result: AssertionResult) -> Result<Option<String>> {
    if result.passed() {
        Ok(None)
    } else {
        Err(Error::TestAssertion(format!("\n{}", result.render().trim_end())))
    }
}
