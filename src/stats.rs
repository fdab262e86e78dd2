//! Reduction of a consolidated run into per-file and total counts.

use crate::error::MergeError;
use crate::merge::consolidate;
use crate::model::{BranchStats, Coverage, Entry, RunResult, ShardSet, Stats};

impl Stats {
    /// Count executable and covered lines, plus branch outcomes when the
    /// entry carries branch data.
    #[must_use]
    pub fn from_entry(entry: &Entry) -> Self {
        let executable = entry.lines.iter().flatten();
        let lines = executable.clone().count() as u64;
        let lines_covered = executable.filter(|&&hits| hits > 0).count() as u64;

        let branches = entry.branches.as_ref().map(|branches| {
            let outcomes = branches.values().flat_map(|outcomes| outcomes.values());
            BranchStats {
                branches: outcomes.clone().count() as u64,
                branches_covered: outcomes.filter(|&&hits| hits > 0).count() as u64,
            }
        });

        Self {
            lines,
            lines_covered,
            branches,
        }
    }

    /// Add two stats. Branch counts are kept when either side has them,
    /// with a side lacking branch data counting as zero.
    #[must_use]
    pub fn combine(&self, other: &Stats) -> Stats {
        let branches = match (self.branches, other.branches) {
            (None, None) => None,
            (a, b) => {
                let (a, b) = (a.unwrap_or_default(), b.unwrap_or_default());
                Some(BranchStats {
                    branches: a.branches + b.branches,
                    branches_covered: a.branches_covered + b.branches_covered,
                })
            }
        };

        Stats {
            lines: self.lines + other.lines,
            lines_covered: self.lines_covered + other.lines_covered,
            branches,
        }
    }
}

/// Summarize a consolidated run.
#[must_use]
pub fn to_stats(result: &RunResult) -> Coverage {
    let file_stats: std::collections::BTreeMap<_, _> = result
        .coverage
        .iter()
        .map(|(path, entry)| (path.clone(), Stats::from_entry(entry)))
        .collect();

    let total_stats = file_stats
        .values()
        .fold(Stats::default(), |total, stats| total.combine(stats));

    Coverage {
        includes_branches: file_stats.values().any(Stats::includes_branches),
        file_stats,
        total_stats,
    }
}

/// Consolidate a shard set and summarize it in one step.
pub fn coverage_of(shards: &ShardSet) -> Result<Coverage, MergeError> {
    consolidate(shards).map(|result| to_stats(&result))
}
