//! In-memory representation of SimpleCov result sets and the summaries
//! derived from them. Everything here is plain data; the algorithms live in
//! [`crate::merge`], [`crate::stats`] and [`crate::diff`].

use std::collections::BTreeMap;

use serde::Serialize;

/// Per-line hit counts, one slot per physical source line. `None` marks a
/// line with no executable code.
pub type Lines = Vec<Option<u64>>;

/// Branch id → outcome id → hit count.
pub type Branches = BTreeMap<String, BTreeMap<String, u64>>;

/// Coverage for a single source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Entry {
    pub lines: Lines,
    /// `None` when the run did not collect branch data at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Branches>,
}

/// One test run's coverage, keyed by file path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunResult {
    pub coverage: BTreeMap<String, Entry>,
    pub timestamp: f64,
}

/// All shards recorded for one revision, keyed by shard name.
pub type ShardSet = BTreeMap<String, RunResult>;

/// Compute a coverage percentage, returning 100.0 when nothing was measured.
#[must_use]
pub fn percentage(covered: u64, total: u64) -> f64 {
    if total == 0 {
        100.0
    } else {
        100.0 * covered as f64 / total as f64
    }
}

/// Branch outcome counts for a file or a total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchStats {
    pub branches: u64,
    pub branches_covered: u64,
}

/// Summary counts for one file or for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub lines: u64,
    pub lines_covered: u64,
    /// Present only when branch data was collected.
    #[serde(flatten)]
    pub branches: Option<BranchStats>,
}

impl Stats {
    #[must_use]
    pub fn includes_branches(&self) -> bool {
        self.branches.is_some()
    }

    #[must_use]
    pub fn line_percentage(&self) -> f64 {
        percentage(self.lines_covered, self.lines)
    }

    /// Branch percentage, treating missing branch data as zero outcomes.
    #[must_use]
    pub fn branch_percentage(&self) -> f64 {
        let b = self.branches.unwrap_or_default();
        percentage(b.branches_covered, b.branches)
    }
}

/// Summary of one revision's coverage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    pub includes_branches: bool,
    pub file_stats: BTreeMap<String, Stats>,
    pub total_stats: Stats,
}

/// Baseline and current stats for the same subject. `baseline` is `None`
/// for files that did not exist in the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsDiff {
    pub baseline: Option<Stats>,
    pub current: Stats,
}

/// A changed file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileDiff {
    /// Display name, with any strip prefix already removed.
    pub filename: String,
    pub baseline: Option<Stats>,
    pub current: Stats,
}

impl FileDiff {
    #[must_use]
    pub fn stats_diff(&self) -> StatsDiff {
        StatsDiff {
            baseline: self.baseline,
            current: self.current,
        }
    }
}

/// Files whose stats changed between two revisions, plus the totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageDiff {
    pub includes_branches: bool,
    pub file_diffs: Vec<FileDiff>,
    pub total_diff: StatsDiff,
}
