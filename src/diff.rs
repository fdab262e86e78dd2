//! Comparison of two coverage summaries.
//!
//! Only files present in the current snapshot whose stats changed (or
//! which are new) are reported. Totals are always carried along, but a diff
//! with no changed files is reported as `None` so callers can skip posting.

use std::collections::BTreeSet;

use crate::model::{Coverage, CoverageDiff, FileDiff, StatsDiff};

// ---------------------------------------------------------------------------
// Coverage diff
// ---------------------------------------------------------------------------

/// Diff `baseline` against `current`. `strip_prefix` (e.g. the checkout
/// directory) is removed from the displayed file names.
#[must_use]
pub fn diff(
    baseline: &Coverage,
    current: &Coverage,
    strip_prefix: Option<&str>,
) -> Option<CoverageDiff> {
    let paths: BTreeSet<&String> = baseline
        .file_stats
        .keys()
        .chain(current.file_stats.keys())
        .collect();

    let file_diffs: Vec<FileDiff> = paths
        .into_iter()
        .filter_map(|path| {
            let current = current.file_stats.get(path)?;
            let baseline = baseline.file_stats.get(path);
            if baseline == Some(current) {
                return None;
            }
            Some(FileDiff {
                filename: display_name(path, strip_prefix).to_string(),
                baseline: baseline.copied(),
                current: *current,
            })
        })
        .collect();

    if file_diffs.is_empty() {
        return None;
    }

    Some(CoverageDiff {
        includes_branches: baseline.includes_branches || current.includes_branches,
        file_diffs,
        total_diff: StatsDiff {
            baseline: Some(baseline.total_stats),
            current: current.total_stats,
        },
    })
}

/// Remove `prefix` and the following separator from `path`. The prefix must
/// end on a path component boundary; other paths are returned unchanged.
#[must_use]
pub fn display_name<'a>(path: &'a str, prefix: Option<&str>) -> &'a str {
    let Some(prefix) = prefix.map(|p| p.trim_end_matches('/')) else {
        return path;
    };
    if prefix.is_empty() {
        return path.trim_start_matches('/');
    }
    match path.strip_prefix(prefix) {
        Some(rest) if rest.is_empty() => rest,
        Some(rest) => rest.strip_prefix('/').unwrap_or(path),
        None => path,
    }
}

impl StatsDiff {
    /// Change in line coverage percentage points, `None` for new files.
    #[must_use]
    pub fn line_delta(&self) -> Option<f64> {
        self.baseline
            .map(|b| self.current.line_percentage() - b.line_percentage())
    }

    /// Change in branch coverage percentage points, `None` for new files.
    #[must_use]
    pub fn branch_delta(&self) -> Option<f64> {
        self.baseline
            .map(|b| self.current.branch_percentage() - b.branch_percentage())
    }
}
