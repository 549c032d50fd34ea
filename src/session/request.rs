//! Request message and metadata construction

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::common::{Error, Result};
use crate::grpc::Metadata;
use crate::variables::render_value;

use super::Session;

/// One `name | value` row of a table input
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableRow {
    pub name: String,
    pub value: String,
}

impl TableRow {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Where fixture file contents come from
#[async_trait]
pub trait FixtureSource: Send + Sync {
    /// Read the fixture called `name` as text
    async fn read(&self, name: &str) -> Result<String>;
}

/// Fixtures stored as files under a directory
#[derive(Debug, Clone)]
pub struct FixtureDir {
    root: PathBuf,
}

impl FixtureDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FixtureSource for FixtureDir {
    async fn read(&self, name: &str) -> Result<String> {
        let path = self.root.join(name);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::FileRead {
                path: path.display().to_string(),
                error: e.to_string(),
            })
    }
}

impl Session {
    /// Set the request message from JSON text, after interpolation
    pub fn set_request_message_from_str(&mut self, content: &str) -> Result<()> {
        let content = self.replace_variables(content);
        self.request_message = serde_json::from_str(&content)
            .map_err(|e| Error::MalformedPayload(format!("request message is not valid JSON: {e}")))?;
        tracing::debug!(message = %self.request_message, "Request message set");
        Ok(())
    }

    /// Set the request message from table rows
    ///
    /// Names and values are interpolated independently; a later row with
    /// the same name overwrites an earlier one.
    pub fn set_request_message_from_table(&mut self, rows: &[TableRow]) {
        let mut body = Map::new();
        for row in rows {
            let name = self.replace_variables(&row.name);
            let value = self.replace_variables(&row.value);
            body.insert(name, Value::String(value));
        }
        self.request_message = Value::Object(body);
        tracing::debug!(message = %self.request_message, "Request message set from table");
    }

    /// Set the request message from a fixture file
    ///
    /// The file name is interpolated before it is read.
    pub async fn set_request_message_from_file(
        &mut self,
        file: &str,
        fixtures: &dyn FixtureSource,
    ) -> Result<()> {
        let file = self.replace_variables(file);
        let content = fixtures.read(&file).await?;
        self.set_request_message_from_str(&content)
    }

    /// Set the request metadata from a JSON object, after interpolation
    ///
    /// Array values add one entry per element under the same key; other
    /// non-string values are added in their text form.
    pub fn set_request_metadata_from_str(&mut self, content: &str) -> Result<()> {
        let content = self.replace_variables(content);
        let parsed: Value = serde_json::from_str(&content)
            .map_err(|e| Error::MalformedPayload(format!("request metadata is not valid JSON: {e}")))?;
        let Value::Object(entries) = parsed else {
            return Err(Error::MalformedPayload(
                "request metadata must be a JSON object".to_string(),
            ));
        };

        let mut metadata = Metadata::new();
        for (key, value) in &entries {
            match value {
                Value::Array(items) => {
                    for item in items {
                        metadata.add(key, render_value(item));
                    }
                }
                other => metadata.add(key, render_value(other)),
            }
        }
        self.request_metadata = metadata;
        tracing::debug!(entries = self.request_metadata.len(), "Request metadata set");
        Ok(())
    }

    /// Set the request metadata from table rows; repeated names are all kept
    pub fn set_request_metadata_from_table(&mut self, rows: &[TableRow]) {
        let mut metadata = Metadata::new();
        for row in rows {
            let name = self.replace_variables(&row.name);
            let value = self.replace_variables(&row.value);
            metadata.add(&name, value);
        }
        self.request_metadata = metadata;
        tracing::debug!(entries = self.request_metadata.len(), "Request metadata set from table");
    }

    /// Set the request metadata from a fixture file
    pub async fn set_request_metadata_from_file(
        &mut self,
        file: &str,
        fixtures: &dyn FixtureSource,
    ) -> Result<()> {
        let file = self.replace_variables(file);
        let content = fixtures.read(&file).await?;
        self.set_request_metadata_from_str(&content)
    }
}
