//! YAML scenario runner
//!
//! Reads test scenarios from YAML files and drives an engine `Session`
//! through their steps, so assertions are made against structured
//! responses rather than printed output.

mod config;
mod runner;

pub use config::*;
pub use runner::{execute_scenario, run_scenario, run_scenarios, TestResult};
