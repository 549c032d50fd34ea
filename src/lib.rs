//! gRPC BDD - behaviour-driven testing for gRPC services
//!
//! This library provides a scenario engine that calls gRPC methods
//! dynamically from runtime-loaded descriptors and asserts on responses,
//! plus a YAML scenario runner built on top of it.

pub mod cli;
pub mod commands;
pub mod common;
pub mod grpc;
pub mod interpolate;
pub mod query;
pub mod session;
pub mod testing;
pub mod variables;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use session::{AssertionResult, Session, TableRow};
pub use variables::{GlobalVariables, Variables};
