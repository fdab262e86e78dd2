use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::model::{Coverage, RunResult, ShardSet};
use crate::schema::parse_shard_set_str;
use crate::stats::coverage_of;

/// Read and validate a result-set file.
pub fn read_shard_set(path: &Path) -> Result<ShardSet> {
    let text = std::fs::read_to_string(path)?;
    let shards = parse_shard_set_str(&text)?;
    info!(path = %path.display(), shards = shards.len(), "read result set");
    Ok(shards)
}

/// Read a result-set file and summarize its consolidated coverage.
pub fn read_coverage(path: &Path) -> Result<Coverage> {
    let shards = read_shard_set(path)?;
    Ok(coverage_of(&shards)?)
}

/// Read several result-set files into one shard set. Shard names that
/// appear in more than one file are suffixed with the file's position (and a
/// counter if that is taken too) so no shard is silently dropped.
pub fn read_shard_sets(paths: &[impl AsRef<Path>]) -> Result<ShardSet> {
    let mut combined = ShardSet::new();
    for (index, path) in paths.iter().enumerate() {
        for (name, result) in read_shard_set(path.as_ref())? {
            let name = unused_name(&combined, name, index);
            combined.insert(name, result);
        }
    }
    Ok(combined)
}

fn unused_name(shards: &ShardSet, name: String, index: usize) -> String {
    if !shards.contains_key(&name) {
        return name;
    }
    let base = format!("{name}#{index}");
    let mut candidate = base.clone();
    let mut n = 1;
    while shards.contains_key(&candidate) {
        candidate = format!("{base}.{n}");
        n += 1;
    }
    candidate
}

/// Serialize a shard set as pretty-printed JSON.
pub fn to_json(shards: &ShardSet) -> Result<String> {
    Ok(serde_json::to_string_pretty(shards)? + "\n")
}

/// Write a shard set to `path` in the result-set format.
pub fn write_shard_set(path: &Path, shards: &ShardSet) -> Result<()> {
    std::fs::write(path, to_json(shards)?)?;
    info!(path = %path.display(), shards = shards.len(), "wrote result set");
    Ok(())
}

/// Wrap a single consolidated run as a one-shard set, the shape written by
/// `covdelta merge`.
#[must_use]
pub fn single_shard(name: &str, result: RunResult) -> ShardSet {
    ShardSet::from([(name.to_string(), result)])
}
