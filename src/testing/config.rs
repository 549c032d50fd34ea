//! Test scenario configuration types
//!
//! Defines the data structures for deserializing YAML test scenarios.

use serde::Deserialize;
use serde_json::Value;

use crate::common::config::ConnectionConfig;
use crate::common::{Error, Result};
use crate::session::TableRow;

/// A complete test scenario loaded from a YAML file
#[derive(Deserialize, Debug)]
pub struct TestScenario {
    /// Name of the test scenario
    pub name: String,
    /// Optional description of what the test verifies
    pub description: Option<String>,
    /// Connection overrides for this scenario
    #[serde(default)]
    pub target: ConnectionConfig,
    /// The sequence of test steps to execute
    pub steps: Vec<TestStep>,
}

/// Variable lifetime
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    Scenario,
    Global,
}

/// Where a request message or metadata comes from; exactly one is set
#[derive(Deserialize, Debug, Default)]
pub struct PayloadSource {
    /// Inline JSON: a string, or a YAML mapping serialized to JSON
    pub content: Option<Value>,
    /// `name`/`value` rows
    pub table: Option<Vec<TableRow>>,
    /// Fixture file name, relative to the fixtures directory
    pub file: Option<String>,
}

/// A resolved payload source
#[derive(Debug)]
pub enum Payload<'a> {
    Content(String),
    Table(&'a [TableRow]),
    File(&'a str),
}

impl PayloadSource {
    pub fn resolve(&self) -> Result<Payload<'_>> {
        match (&self.content, &self.table, &self.file) {
            (Some(content), None, None) => Ok(Payload::Content(match content {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })),
            (None, Some(rows), None) => Ok(Payload::Table(rows)),
            (None, None, Some(file)) => Ok(Payload::File(file)),
            _ => Err(Error::Config(
                "exactly one of 'content', 'table' or 'file' must be given".to_string(),
            )),
        }
    }
}

/// A single test step in the execution flow
#[derive(Deserialize, Debug)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Store a raw value in a variable scope
    Store {
        name: String,
        value: Value,
        #[serde(default)]
        scope: Scope,
    },
    /// Replace the pending request message
    SetRequestMessage(PayloadSource),
    /// Replace the pending request metadata
    SetRequestMetadata(PayloadSource),
    /// Call an RPC with the pending request
    Request {
        rpc: String,
        /// The call is expected to be rejected by the service
        #[serde(default)]
        expect_error: bool,
    },
    /// Store the value at a response path in a variable
    StoreResponsePath {
        path: String,
        name: String,
        #[serde(default)]
        scope: Scope,
    },
    /// Assert that a global variable is defined
    AssertDefined { name: String },
    /// Assert the status of the last call
    AssertStatus { status: String },
    /// Assert that the value at a response path matches a pattern
    AssertPath {
        path: String,
        matches: Option<String>,
        not_matches: Option<String>,
    },
    /// Assert that the value at a response path is an array
    AssertArray {
        path: String,
        /// Expected length; may contain placeholders
        length: Option<String>,
    },
    /// Compare a variable's value
    AssertVariable {
        name: String,
        #[serde(default)]
        scope: Scope,
        equals: Option<String>,
        not_equals: Option<String>,
    },
}

impl TestStep {
    /// Short description used in progress output
    pub fn describe(&self) -> String {
        match self {
            TestStep::Store { name, scope, .. } => format!("store {name} in {scope:?} scope"),
            TestStep::SetRequestMessage(_) => "set request message".to_string(),
            TestStep::SetRequestMetadata(_) => "set request metadata".to_string(),
            TestStep::Request { rpc, .. } => format!("request {rpc}"),
            TestStep::StoreResponsePath { path, name, .. } => format!("store {path} as {name}"),
            TestStep::AssertDefined { name } => format!("{name} is defined"),
            TestStep::AssertStatus { status } => format!("status is {status}"),
            TestStep::AssertPath { path, .. } => format!("check {path}"),
            TestStep::AssertArray { path, length } => match length {
                Some(n) => format!("{path} is an array of {n}"),
                None => format!("{path} is an array"),
            },
            TestStep::AssertVariable { name, .. } => format!("check variable {name}"),
        }
    }
}
