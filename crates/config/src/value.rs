// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deep-merge semantics for layered YAML values.
//!
//! Maps merge recursively. Arrays replace by default; a leading marker
//! string changes the mode: `"+"` appends to the lower layer, `"="` replaces
//! (explicit default), `"-"` removes matching elements. Marker strings are
//! filtered out before the array is consumed.

use serde_yaml::{Mapping, Value};

/// Array merge mode selected by a leading marker element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayMode {
    Replace,
    Append,
    Remove,
}

fn split_markers(seq: &[Value]) -> (ArrayMode, Vec<Value>) {
    let mode = match seq.first().and_then(Value::as_str) {
        Some("+") => ArrayMode::Append,
        Some("-") => ArrayMode::Remove,
        Some("=") => ArrayMode::Replace,
        _ => {
            return (ArrayMode::Replace, seq.to_vec());
        }
    };
    (mode, seq[1..].to_vec())
}

/// Merge `overlay` over `base`, consuming both.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            Value::Mapping(merge_mappings(base, overlay))
        }
        (Value::Sequence(base), Value::Sequence(overlay)) => {
            let (mode, items) = split_markers(&overlay);
            match mode {
                ArrayMode::Replace => Value::Sequence(items),
                ArrayMode::Append => {
                    let mut out = base;
                    out.extend(items);
                    Value::Sequence(out)
                }
                ArrayMode::Remove => Value::Sequence(
                    base.into_iter().filter(|v| !items.contains(v)).collect(),
                ),
            }
        }
        // Scalar vs anything, or mismatched shapes: overlay wins.
        (_, overlay) => overlay,
    }
}

fn merge_mappings(base: Mapping, overlay: Mapping) -> Mapping {
    let mut out = base;
    for (key, value) in overlay {
        match out.remove(&key) {
            Some(existing) => {
                let merged = deep_merge(existing, value);
                out.insert(key, merged);
            }
            None => {
                // A bare marker array in an overlay with no base still needs
                // its markers stripped before use.
                let value = match value {
                    Value::Sequence(seq) => {
                        let (_, items) = split_markers(&seq);
                        Value::Sequence(items)
                    }
                    other => other,
                };
                out.insert(key, value);
            }
        }
    }
    out
}

/// Walk a dotted key path through nested mappings.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut cur = value;
    for part in path.split('.') {
        cur = cur.as_mapping()?.get(Value::from(part))?;
    }
    Some(cur)
}

/// Required string at a dotted path.
pub fn require_str(value: &Value, path: &str) -> Result<String, crate::ConfigError> {
    let v = lookup(value, path).ok_or_else(|| crate::ConfigError::MissingKey {
        key: path.to_string(),
    })?;
    v.as_str()
        .map(str::to_string)
        .ok_or_else(|| crate::ConfigError::InvalidType {
            key: path.to_string(),
            expected: "string",
        })
}

/// Required list of strings at a dotted path (markers filtered).
pub fn require_str_list(value: &Value, path: &str) -> Result<Vec<String>, crate::ConfigError> {
    let v = lookup(value, path).ok_or_else(|| crate::ConfigError::MissingKey {
        key: path.to_string(),
    })?;
    str_list(v).ok_or_else(|| crate::ConfigError::InvalidType {
        key: path.to_string(),
        expected: "list of strings",
    })
}

/// Optional list of strings; `None` when the key is absent.
pub fn optional_str_list(value: &Value, path: &str) -> Option<Vec<String>> {
    lookup(value, path).and_then(str_list)
}

fn str_list(v: &Value) -> Option<Vec<String>> {
    let seq = v.as_sequence()?;
    let mut out = Vec::new();
    for item in seq {
        let s = item.as_str()?;
        if s == "+" || s == "=" || s == "-" {
            continue;
        }
        out.push(s.to_string());
    }
    Some(out)
}

/// Optional boolean with a default.
pub fn bool_or(value: &Value, path: &str, default: bool) -> bool {
    lookup(value, path).and_then(Value::as_bool).unwrap_or(default)
}

/// Optional u64 with a default.
pub fn u64_or(value: &Value, path: &str, default: u64) -> u64 {
    lookup(value, path).and_then(Value::as_u64).unwrap_or(default)
}

/// Optional f64 with a default.
pub fn f64_or(value: &Value, path: &str, default: f64) -> f64 {
    lookup(value, path).and_then(Value::as_f64).unwrap_or(default)
}

/// Optional string with a default.
pub fn str_or(value: &Value, path: &str, default: &str) -> String {
    lookup(value, path)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
