//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::grpc::{ClientConnectionSpec, ClientOptions, Credentials, LoaderOptions};
use crate::interpolate::DEFAULT_DELIMITER;

use super::paths::{config_path, resolve_relative};
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Default connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Descriptor loading and JSON mapping
    #[serde(default)]
    pub loader: LoaderOptions,

    /// Variable interpolation settings
    #[serde(default)]
    pub variables: VariablesConfig,

    /// Fixture file settings
    #[serde(default)]
    pub fixtures: FixturesConfig,
}

/// Connection settings; every field can be overridden per scenario
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Proto source or encoded descriptor set
    pub proto: Option<PathBuf>,
    /// Fully-qualified service name
    pub service: Option<String>,
    /// `host:port` or URI of the service
    pub host: Option<String>,
    /// Use TLS transport credentials
    pub tls: Option<bool>,
    /// PEM CA bundle for TLS
    pub ca_cert: Option<PathBuf>,
    /// TLS server name override
    pub domain: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl ConnectionConfig {
    /// Field-wise merge; values set in `over` win
    pub fn merged(&self, over: &ConnectionConfig) -> ConnectionConfig {
        ConnectionConfig {
            proto: over.proto.clone().or_else(|| self.proto.clone()),
            service: over.service.clone().or_else(|| self.service.clone()),
            host: over.host.clone().or_else(|| self.host.clone()),
            tls: over.tls.or(self.tls),
            ca_cert: over.ca_cert.clone().or_else(|| self.ca_cert.clone()),
            domain: over.domain.clone().or_else(|| self.domain.clone()),
            connect_timeout_secs: over.connect_timeout_secs.or(self.connect_timeout_secs),
            timeout_secs: over.timeout_secs.or(self.timeout_secs),
            user_agent: over.user_agent.clone().or_else(|| self.user_agent.clone()),
        }
    }

    /// Resolve relative file paths against `base`
    pub fn relative_to(mut self, base: &Path) -> Self {
        self.proto = self.proto.map(|p| resolve_relative(base, &p));
        self.ca_cert = self.ca_cert.map(|p| resolve_relative(base, &p));
        self
    }

    /// Build a client connection spec; proto, service and host are required
    pub fn to_spec(&self, loader: &LoaderOptions) -> Result<ClientConnectionSpec> {
        let missing = |field: &str| Error::Config(format!("connection '{field}' is not set"));

        let credentials = if self.tls.unwrap_or(false) {
            Credentials::Tls {
                ca_cert: self.ca_cert.clone(),
                domain: self.domain.clone(),
            }
        } else {
            Credentials::Insecure
        };

        Ok(ClientConnectionSpec {
            descriptor: self.proto.clone().ok_or_else(|| missing("proto"))?,
            loader: loader.clone(),
            service: self.service.clone().ok_or_else(|| missing("service"))?,
            host: self.host.clone().ok_or_else(|| missing("host"))?,
            credentials,
            options: ClientOptions {
                connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
                timeout: self.timeout_secs.map(Duration::from_secs),
                user_agent: self.user_agent.clone(),
            },
        })
    }
}

/// Variable interpolation settings
#[derive(Debug, Deserialize)]
pub struct VariablesConfig {
    /// Placeholder delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for VariablesConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

/// Fixture file settings
#[derive(Debug, Deserialize, Default)]
pub struct FixturesConfig {
    /// Directory fixture files are read from; defaults to each scenario's directory
    pub directory: Option<PathBuf>,
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. Otherwise the default config file is
    /// used when present, and built-in defaults when it is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match config_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        let config: Self =
            toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}
