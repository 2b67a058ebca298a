use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::{FlowError, Result};

/// Reserved key marking a placeholder mapping: `{"$ref": "input.task"}`.
pub const REF_KEY: &str = "$ref";

/// Format: `input.key(.key)*` or `results.nodeId(.key)*`
static REF_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(input|results)((?:\.[^.]+)+)$").unwrap());

/// Resolve `$ref` placeholders in a JSON value recursively.
///
/// A mapping whose only key is `$ref` with a string value is replaced by the
/// value it points at; every other mapping or sequence is rebuilt element by
/// element and scalars are returned as they are.
pub fn resolve(
    value: &Value,
    input: &Value,
    results: &Map<String, Value>,
) -> Result<Value> {
    match value {
        Value::Object(obj) => {
            if let Some(path) = placeholder(obj) {
                return lookup(path, input, results);
            }
            resolve_map(obj, input, results).map(Value::Object)
        }
        Value::Array(arr) => {
            let resolved: Result<Vec<Value>> = arr.iter().map(|v| resolve(v, input, results)).collect();
            Ok(Value::Array(resolved?))
        }
        _ => Ok(value.clone()),
    }
}

/// Resolve every value of a parameter mapping.
pub fn resolve_map(
    params: &Map<String, Value>,
    input: &Value,
    results: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    params.iter().map(|(k, v)| resolve(v, input, results).map(|rv| (k.clone(), rv))).collect()
}

fn placeholder(obj: &Map<String, Value>) -> Option<&str> {
    if obj.len() != 1 {
        return None;
    }
    obj.get(REF_KEY).and_then(Value::as_str)
}

fn lookup(
    path: &str,
    input: &Value,
    results: &Map<String, Value>,
) -> Result<Value> {
    let caps = REF_PATH.captures(path).ok_or_else(|| FlowError::RefSyntax(path.to_string()))?;
    let mut segments = caps[2][1..].split('.');

    let mut current = if &caps[1] == "input" {
        input
    } else {
        // the regex guarantees at least one segment
        let nid = segments.next().unwrap_or_default();
        results.get(nid).ok_or_else(|| FlowError::RefNotFound(path.to_string()))?
    };

    for segment in segments {
        let next = match current {
            Value::Object(obj) => obj.get(segment),
            Value::Array(arr) => segment.parse::<usize>().ok().and_then(|i| arr.get(i)),
            _ => None,
        };
        current = next.ok_or_else(|| FlowError::RefNotFound(path.to_string()))?;
    }

    Ok(current.clone())
}
