//! Error types for the gRPC BDD harness
//!
//! Errors are split by where they surface: construction-time errors abort
//! the whole run, everything else fails only the step that raised it.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Client Construction Errors ===
    #[error("Unable to build gRPC client for '{path}': {reason}. Check the service name against the proto package")]
    ClientConstruction { path: String, reason: String },

    #[error("Failed to load service descriptor '{path}': {reason}")]
    DescriptorLoad { path: String, reason: String },

    // === Invocation Errors ===
    #[error("{0} is not a valid resource")]
    UnknownMethod(String),

    #[error("RPC '{0}' is a streaming method; only unary calls are supported")]
    UnsupportedMethod(String),

    #[error("RPC failed with status {code}: {message}")]
    Invocation { code: String, message: String },

    // === Payload Errors ===
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid metadata entry '{key}': {reason}")]
    InvalidMetadata { key: String, reason: String },

    // === Assertion Input Errors ===
    #[error("Invalid path expression '{path}': {reason}")]
    PathSyntax { path: String, reason: String },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Test Errors ===
    #[error("Test assertion failed: {0}")]
    TestAssertion(String),
}

impl Error {
    /// Create a client construction error for a service resolution path
    pub fn client_construction(path: &str, reason: impl std::fmt::Display) -> Self {
        Self::ClientConstruction {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a descriptor load error
    pub fn descriptor_load(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        Self::DescriptorLoad {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid metadata error
    pub fn invalid_metadata(key: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidMetadata {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a path syntax error
    pub fn path_syntax(path: &str, reason: impl std::fmt::Display) -> Self {
        Self::PathSyntax {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error aborts the whole run rather than a single step
    ///
    /// Without a client there is nothing left to run, so construction
    /// failures are fatal. Everything else is reported at the step boundary.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ClientConstruction { .. }
                | Error::DescriptorLoad { .. }
                | Error::Config(_)
                | Error::ConfigParse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_errors_are_fatal() {
        assert!(Error::client_construction("helloworld.Nope", "missing").is_fatal());
        assert!(Error::descriptor_load(std::path::Path::new("x.proto"), "gone").is_fatal());
    }

    #[test]
    fn test_step_errors_are_not_fatal() {
        assert!(!Error::UnknownMethod("doesNotExist".into()).is_fatal());
        assert!(!Error::MalformedPayload("eof".into()).is_fatal());
        assert!(!Error::path_syntax("$[", "eof").is_fatal());
        assert!(!Error::Invocation {
            code: "INVALID_ARGUMENT".into(),
            message: "bad".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_unknown_method_names_the_resource() {
        let err = Error::UnknownMethod("doesNotExist".into());
        assert_eq!(err.to_string(), "doesNotExist is not a valid resource");
    }
}
