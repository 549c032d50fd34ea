//! JSONPath queries over response documents

use serde_json::Value;
use serde_json_path::JsonPath;

use crate::common::{Error, Result};

/// Evaluate `path` against `document` and return the first match
///
/// Paths may omit the leading `$`: `items[0].id` and `.items[0].id` are
/// read as `$.items[0].id`, and `[0]` as `$[0]`. Returns `Ok(None)` when the path
/// is valid but matches nothing.
pub fn evaluate(path: &str, document: &Value) -> Result<Option<Value>> {
    let expression = normalize(path);
    let query = JsonPath::parse(&expression).map_err(|e| Error::path_syntax(path, e))?;
    Ok(query.query(document).first().cloned())
}

fn normalize(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('$') {
        path.to_string()
    } else if path.starts_with('[') || path.starts_with('.') {
        format!("${path}")
    } else {
        format!("$.{path}")
    }
}
