//! Consolidation of sharded results for one revision.
//!
//! Hit counts are summed. Any structural disagreement (different line
//! counts, executability or branch layout) means the inputs come from
//! different source revisions, and the whole merge fails.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{MergeError, Mismatch};
use crate::model::{Branches, Entry, Lines, RunResult, ShardSet};

/// Sum two line vectors position by position.
pub fn merge_lines(a: &[Option<u64>], b: &[Option<u64>]) -> Result<Lines, Mismatch> {
    if a.len() != b.len() {
        return Err(Mismatch::LineCount {
            left: a.len(),
            right: b.len(),
        });
    }

    a.iter()
        .zip(b)
        .enumerate()
        .map(|(i, pair)| match pair {
            (None, None) => Ok(None),
            (Some(l), Some(r)) => Ok(Some(l.saturating_add(*r))),
            _ => Err(Mismatch::Executability { line: i + 1 }),
        })
        .collect()
}

/// Merge two optional branch maps. A missing side means "not collected",
/// so the other side is returned unchanged.
pub fn merge_branches(
    a: Option<&Branches>,
    b: Option<&Branches>,
) -> Result<Option<Branches>, Mismatch> {
    let (a, b) = match (a, b) {
        (None, other) | (other, None) => return Ok(other.cloned()),
        (Some(a), Some(b)) => (a, b),
    };

    if a.len() != b.len() {
        return Err(Mismatch::BranchKeys);
    }

    let mut merged = Branches::new();
    for (branch, left) in a {
        let right = b.get(branch).ok_or(Mismatch::BranchKeys)?;
        merged.insert(branch.clone(), merge_outcomes(branch, left, right)?);
    }
    Ok(Some(merged))
}

fn merge_outcomes(
    branch: &str,
    a: &BTreeMap<String, u64>,
    b: &BTreeMap<String, u64>,
) -> Result<BTreeMap<String, u64>, Mismatch> {
    let mismatch = || Mismatch::OutcomeKeys {
        branch: branch.to_string(),
    };
    if a.len() != b.len() {
        return Err(mismatch());
    }
    a.iter()
        .map(|(outcome, l)| -> Result<(String, u64), Mismatch> {
            let r = b.get(outcome).ok_or_else(mismatch)?;
            Ok((outcome.clone(), l.saturating_add(*r)))
        })
        .collect()
}

pub fn merge_entries(a: &Entry, b: &Entry) -> Result<Entry, Mismatch> {
    Ok(Entry {
        lines: merge_lines(&a.lines, &b.lines)?,
        branches: merge_branches(a.branches.as_ref(), b.branches.as_ref())?,
    })
}

/// Merge two run results: union of files, later timestamp wins.
pub fn merge_results(a: &RunResult, b: &RunResult) -> Result<RunResult, MergeError> {
    let mut coverage = a.coverage.clone();
    for (file, right) in &b.coverage {
        let entry = match a.coverage.get(file) {
            Some(left) => merge_entries(left, right).map_err(|source| MergeError {
                file: file.clone(),
                source,
            })?,
            None => right.clone(),
        };
        coverage.insert(file.clone(), entry);
    }

    Ok(RunResult {
        coverage,
        timestamp: a.timestamp.max(b.timestamp),
    })
}

/// Combine every shard of a revision into one result. An empty shard set
/// yields an empty result.
pub fn consolidate(shards: &ShardSet) -> Result<RunResult, MergeError> {
    let mut iter = shards.iter();
    let Some((first_name, first)) = iter.next() else {
        return Ok(RunResult::default());
    };
    debug!(shard = %first_name, files = first.coverage.len(), "starting consolidation");

    iter.try_fold(first.clone(), |acc, (name, shard)| {
        debug!(shard = %name, files = shard.coverage.len(), "merging shard");
        merge_results(&acc, shard)
    })
}
