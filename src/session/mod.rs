//! Engine session
//!
//! A `Session` holds the state of one running scenario: the client it
//! talks to, the pending request, the last response and the scenario's
//! variables. Steps mutate it strictly in sequence; it is never shared
//! between scenarios.

mod assert;
mod invoke;
mod request;

use std::sync::Arc;

use serde_json::{Map, Value};
use tonic::{Code, Status};

use crate::common::Result;
use crate::grpc::{create_client, ClientConnectionSpec, Metadata, RpcClient};
use crate::interpolate::{interpolate, DEFAULT_DELIMITER};
use crate::query;
use crate::variables::{merge_scopes, GlobalVariables, Variables};

pub use assert::AssertionResult;
pub use request::{FixtureDir, FixtureSource, TableRow};

/// State of one running scenario
pub struct Session {
    client: Arc<dyn RpcClient>,
    globals: GlobalVariables,
    scenario: Variables,
    delimiter: String,
    request_message: Value,
    request_metadata: Metadata,
    response_message: Value,
    response_status: Code,
    response_error: Option<Status>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("delimiter", &self.delimiter)
            .field("scenario_vars", &self.scenario.len())
            .field("request_message", &self.request_message)
            .field("response_status", &self.response_status)
            .finish()
    }
}

impl Session {
    /// Create a session around an already constructed client
    pub fn new(client: Arc<dyn RpcClient>, globals: GlobalVariables) -> Self {
        Self {
            client,
            globals,
            scenario: Variables::new(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            request_message: Value::Object(Map::new()),
            request_metadata: Metadata::new(),
            response_message: Value::Object(Map::new()),
            response_status: Code::Ok,
            response_error: None,
        }
    }

    /// Build the client for `spec` and create a session around it
    ///
    /// Fails with `ClientConstruction` if the service cannot be resolved;
    /// no session exists without a client.
    pub fn connect(spec: &ClientConnectionSpec, globals: GlobalVariables) -> Result<Self> {
        let client = create_client(spec)?;
        Ok(Self::new(Arc::new(client), globals))
    }

    /// Use a different placeholder delimiter
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    // === Variables ===

    pub fn store_value_in_scenario_scope(&mut self, name: &str, value: impl Into<Value>) {
        self.scenario.set(name, value);
    }

    pub fn store_value_in_global_scope(&self, name: &str, value: impl Into<Value>) {
        self.globals.set(name, value);
    }

    pub fn scenario_variable(&self, name: &str) -> Option<&Value> {
        self.scenario.get(name)
    }

    pub fn global_variable(&self, name: &str) -> Option<Value> {
        self.globals.get(name)
    }

    /// Store the value at a response path in scenario scope
    ///
    /// Only the path is interpolated; the variable name is taken as is.
    /// A path that matches nothing stores null.
    pub fn store_response_path_in_scenario_scope(&mut self, path: &str, name: &str) -> Result<()> {
        let value = self.response_path_value(&self.replace_variables(path))?;
        self.scenario.set(name, value.unwrap_or(Value::Null));
        Ok(())
    }

    /// Store the value at a response path in global scope
    pub fn store_response_path_in_global_scope(&self, path: &str, name: &str) -> Result<()> {
        let value = self.response_path_value(&self.replace_variables(path))?;
        self.globals.set(name, value.unwrap_or(Value::Null));
        Ok(())
    }

    /// Substitute placeholders using both scopes, scenario values first
    pub fn replace_variables(&self, text: &str) -> String {
        let merged = merge_scopes(&self.globals, &self.scenario);
        interpolate(text, &merged, &self.delimiter)
    }

    // === State accessors ===

    pub fn request_message(&self) -> &Value {
        &self.request_message
    }

    pub fn request_metadata(&self) -> &Metadata {
        &self.request_metadata
    }

    pub fn response_message(&self) -> &Value {
        &self.response_message
    }

    pub fn response_status(&self) -> Code {
        self.response_status
    }

    pub fn response_error(&self) -> Option<&Status> {
        self.response_error.as_ref()
    }

    /// First value at `path` in the last response
    pub fn response_path_value(&self, path: &str) -> Result<Option<Value>> {
        query::evaluate(path, &self.response_message)
    }
}
