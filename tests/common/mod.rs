#![allow(dead_code)]

use std::path::PathBuf;

use covdelta::model::{Entry, Lines, RunResult};
use tempfile::TempDir;

/// Write a JSON fixture into `dir`, returning its path. The caller must hold
/// onto `TempDir` to keep the file alive.
pub fn write_fixture(dir: &TempDir, name: &str, json: &serde_json::Value) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string_pretty(json).unwrap()).unwrap();
    path
}

/// A lines-only run result.
pub fn result(files: &[(&str, Lines)], timestamp: f64) -> RunResult {
    RunResult {
        coverage: files
            .iter()
            .map(|(path, lines)| {
                (
                    path.to_string(),
                    Entry {
                        lines: lines.clone(),
                        branches: None,
                    },
                )
            })
            .collect(),
        timestamp,
    }
}
