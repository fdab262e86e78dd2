//! Validation of untrusted result-set JSON into the typed model.
//!
//! Expected shape (SimpleCov `.resultset.json`):
//!
//! ```text
//! {
//!   "<shard>": {
//!     "coverage": {
//!       "<path>": {
//!         "lines": [null, 1, 0, ...],
//!         "branches": { "<branch>": { "<outcome>": 3, ... }, ... }   // optional
//!       }
//!     },
//!     "timestamp": 1700000000
//!   }
//! }
//! ```
//!
//! Unknown keys are ignored. Everything else is checked eagerly: the first
//! offending value fails the whole parse with its JSON path.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::model::{Branches, Entry, Lines, RunResult, ShardSet};

type Result<T> = std::result::Result<T, SchemaError>;

/// Parse result-set JSON text.
pub fn parse_shard_set_str(text: &str) -> Result<ShardSet> {
    let raw: Value = serde_json::from_str(text)
        .map_err(|e| SchemaError::new("$", format!("valid JSON ({e})")))?;
    parse_shard_set(&raw)
}

/// Validate an already-decoded JSON value as a shard set.
pub fn parse_shard_set(raw: &Value) -> Result<ShardSet> {
    let shards = object(raw, "$")?;
    let mut set = ShardSet::new();
    for (name, value) in shards {
        let path = format!("${}", key(name));
        set.insert(name.clone(), parse_result(value, &path)?);
    }
    Ok(set)
}

fn parse_result(value: &Value, path: &str) -> Result<RunResult> {
    let fields = object(value, path)?;

    let coverage_path = format!("{path}.coverage");
    let files = object(required(fields, "coverage", path)?, &coverage_path)?;
    let mut coverage = BTreeMap::new();
    for (file, entry) in files {
        let entry_path = format!("{coverage_path}{}", key(file));
        coverage.insert(file.clone(), parse_entry(entry, &entry_path)?);
    }

    let timestamp_path = format!("{path}.timestamp");
    let timestamp = required(fields, "timestamp", path)?
        .as_f64()
        .ok_or_else(|| SchemaError::new(timestamp_path, "a number"))?;

    Ok(RunResult {
        coverage,
        timestamp,
    })
}

fn parse_entry(value: &Value, path: &str) -> Result<Entry> {
    let fields = object(value, path)?;

    let lines_path = format!("{path}.lines");
    let lines = parse_lines(required(fields, "lines", path)?, &lines_path)?;

    let branches = match fields.get("branches") {
        None => None,
        Some(b) => Some(parse_branches(b, &format!("{path}.branches"))?),
    };

    Ok(Entry { lines, branches })
}

fn parse_lines(value: &Value, path: &str) -> Result<Lines> {
    let items = value
        .as_array()
        .ok_or_else(|| SchemaError::new(path, "an array"))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Null => Ok(None),
            _ => count(item, &format!("{path}[{i}]")).map(Some),
        })
        .collect()
}

fn parse_branches(value: &Value, path: &str) -> Result<Branches> {
    let mut branches = Branches::new();
    for (branch, outcomes) in object(value, path)? {
        let branch_path = format!("{path}{}", key(branch));
        let mut counts = BTreeMap::new();
        for (outcome, hits) in object(outcomes, &branch_path)? {
            let hits = count(hits, &format!("{branch_path}{}", key(outcome)))?;
            counts.insert(outcome.clone(), hits);
        }
        branches.insert(branch.clone(), counts);
    }
    Ok(branches)
}

fn object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| SchemaError::new(path, "an object"))
}

fn required<'a>(fields: &'a Map<String, Value>, name: &str, path: &str) -> Result<&'a Value> {
    fields
        .get(name)
        .ok_or_else(|| SchemaError::new(format!("{path}.{name}"), "a value (missing)"))
}

fn count(value: &Value, path: &str) -> Result<u64> {
    value
        .as_u64()
        .ok_or_else(|| SchemaError::new(path, "a non-negative integer"))
}

fn key(name: &str) -> String {
    format!("[{name:?}]")
}
