//! Assertions over session state
//!
//! A mismatch is not an error: every assertion returns an
//! `AssertionResult` and the caller decides pass or fail by comparing its
//! `expected` and `actual` flags. Errors are reserved for inputs that
//! cannot be evaluated at all (bad patterns, bad paths).

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::common::{Error, Result};
use crate::grpc::status::{code_from_name, code_name};
use crate::variables::{render_optional, render_value};

use super::Session;

/// Outcome of one assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionResult {
    pub expected: bool,
    pub actual: bool,
    /// What was expected, for failure reports
    pub expected_expression: String,
    /// What was observed, for failure reports
    pub actual_value: String,
}

impl AssertionResult {
    pub fn new(
        expected: bool,
        actual: bool,
        expected_expression: impl Into<String>,
        actual_value: impl Into<String>,
    ) -> Self {
        Self {
            expected,
            actual,
            expected_expression: expected_expression.into(),
            actual_value: actual_value.into(),
        }
    }

    pub fn passed(&self) -> bool {
        self.expected == self.actual
    }

    /// Render as a YAML failure report
    pub fn render(&self) -> String {
        #[derive(Serialize)]
        struct Report<'a> {
            assertion: &'a AssertionResult,
        }
        serde_yaml::to_string(&Report { assertion: self })
            .unwrap_or_else(|_| format!("assertion: {:?}", self))
    }
}

/// Regex test of `actual_value` against `expected_expression`
pub fn assert_match(actual_value: &str, expected_expression: &str) -> Result<AssertionResult> {
    let matched = compile(expected_expression)?.is_match(actual_value);
    Ok(AssertionResult::new(true, matched, expected_expression, actual_value))
}

/// Inverse of [`assert_match`]: the same test, expected to be false
pub fn assert_not_match(actual_value: &str, expected_expression: &str) -> Result<AssertionResult> {
    let matched = compile(expected_expression)?.is_match(actual_value);
    Ok(AssertionResult::new(false, matched, expected_expression, actual_value))
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::invalid_pattern(pattern, e))
}

/// Name of a value's type, as reported by array checks
fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        None | Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

impl Session {
    /// The global variable `name` exists and is not null
    pub fn assert_global_variable_exists(&self, name: &str) -> AssertionResult {
        let exists = matches!(self.global_variable(name), Some(v) if !v.is_null());
        AssertionResult::new(true, exists, "defined", if exists { "defined" } else { "undefined" })
    }

    /// The last call finished with the status named by `value`
    ///
    /// `value` is a canonical status name or numeric code; a name outside
    /// the status set never matches.
    pub fn assert_response_status_match(&self, value: &str) -> AssertionResult {
        let actual = self.response_status();
        match code_from_name(value) {
            Some(expected) => AssertionResult::new(
                true,
                expected == actual,
                code_name(expected),
                code_name(actual),
            ),
            None => AssertionResult::new(true, false, value.trim(), code_name(actual)),
        }
    }

    /// The value at `path` in the response matches the pattern `regexp`
    pub fn assert_path_in_response_message_matches_expression(
        &self,
        path: &str,
        regexp: &str,
    ) -> Result<AssertionResult> {
        let (value, regexp) = self.resolve_path_and_expression(path, regexp)?;
        assert_match(&value, &regexp)
    }

    /// The value at `path` in the response does not match `regexp`
    pub fn assert_path_in_response_message_does_not_match_expression(
        &self,
        path: &str,
        regexp: &str,
    ) -> Result<AssertionResult> {
        let (value, regexp) = self.resolve_path_and_expression(path, regexp)?;
        assert_not_match(&value, &regexp)
    }

    fn resolve_path_and_expression(&self, path: &str, regexp: &str) -> Result<(String, String)> {
        let path = self.replace_variables(path);
        let regexp = self.replace_variables(regexp);
        let value = self.response_path_value(&path)?.unwrap_or(Value::Null);
        Ok((render_value(&value), regexp))
    }

    /// The value at `path` in the response is an array
    pub fn assert_path_is_array(&self, path: &str) -> Result<AssertionResult> {
        let value = self.response_path_value(&self.replace_variables(path))?;
        let is_array = matches!(value, Some(Value::Array(_)));
        Ok(AssertionResult::new(true, is_array, "array", type_name(value.as_ref())))
    }

    /// The value at `path` in the response is an array of `length` items
    ///
    /// The observed length is reported as `?` when the value is not an array.
    pub fn assert_path_is_array_with_length(
        &self,
        path: &str,
        length: &str,
    ) -> Result<AssertionResult> {
        let path = self.replace_variables(path);
        let length = self.replace_variables(length);
        let value = self.response_path_value(&path)?;

        let (success, actual) = match value {
            Some(Value::Array(items)) => {
                let expected = length.trim().parse::<f64>().ok();
                (expected == Some(items.len() as f64), items.len().to_string())
            }
            _ => (false, "?".to_string()),
        };
        Ok(AssertionResult::new(true, success, length, actual))
    }

    /// The scenario variable `name` renders as `value`
    pub fn assert_scenario_variable_value_equal(&self, name: &str, value: &str) -> AssertionResult {
        let expected = self.replace_variables(value);
        let actual = render_optional(self.scenario_variable(name));
        AssertionResult::new(true, expected == actual, expected, actual)
    }

    /// The scenario variable `name` does not render as `value`
    pub fn assert_scenario_variable_value_not_equal(
        &self,
        name: &str,
        value: &str,
    ) -> AssertionResult {
        let expected = self.replace_variables(value);
        let actual = render_optional(self.scenario_variable(name));
        AssertionResult::new(false, expected == actual, expected, actual)
    }

    /// The global variable `name` renders as `value`
    pub fn assert_global_variable_value_equal(&self, name: &str, value: &str) -> AssertionResult {
        let expected = self.replace_variables(value);
        let actual = render_optional(self.global_variable(name).as_ref());
        AssertionResult::new(true, expected == actual, expected, actual)
    }

    /// The global variable `name` does not render as `value`
    pub fn assert_global_variable_value_not_equal(
        &self,
        name: &str,
        value: &str,
    ) -> AssertionResult {
        let expected = self.replace_variables(value);
        let actual = render_optional(self.global_variable(name).as_ref());
        AssertionResult::new(false, expected == actual, expected, actual)
    }
}
