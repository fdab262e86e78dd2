//! Command handler functions for the covdelta CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{anyhow, Context, Result};
use chrono::DateTime;
use clap::ValueEnum;
use tracing::info;

use crate::config::Config;
use crate::diff::diff;
use crate::github::{replace_report, CommentApi};
use crate::ingest::{
    read_coverage, read_shard_set, read_shard_sets, single_shard, to_json, write_shard_set,
};
use crate::merge::consolidate;
use crate::model::{Coverage, CoverageDiff};
use crate::report::{CoverageReport, MarkdownFormatter, TextFormatter};
use crate::stats::to_stats;

/// Output style for the `diff` command.
#[derive(Clone, ValueEnum)]
pub enum Style {
    Text,
    Markdown,
    Json,
}

const NO_CHANGES: &str = "No coverage changes.\n";

pub fn cmd_summary(file: &Path) -> Result<String> {
    let shards =
        read_shard_set(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let result = consolidate(&shards)?;
    let coverage = to_stats(&result);
    let total = coverage.total_stats;

    let mut out = String::new();
    writeln!(out, "Shards:     {}", shards.len()).unwrap();
    writeln!(out, "Files:      {}", coverage.file_stats.len()).unwrap();
    writeln!(
        out,
        "Lines:      {}/{} ({:.1}%)",
        total.lines_covered,
        total.lines,
        total.line_percentage()
    )
    .unwrap();
    if let Some(branches) = total.branches {
        writeln!(
            out,
            "Branches:   {}/{} ({:.1}%)",
            branches.branches_covered,
            branches.branches,
            total.branch_percentage()
        )
        .unwrap();
    }
    if !shards.is_empty() {
        if let Some(run) = DateTime::from_timestamp(result.timestamp as i64, 0) {
            writeln!(out, "Last run:   {}", run.to_rfc3339()).unwrap();
        }
    }
    Ok(out)
}

/// Consolidate one or more result-set files into a single-shard result set.
/// Writes to `output` when given, otherwise returns the JSON.
pub fn cmd_merge(inputs: &[PathBuf], output: Option<&Path>, name: &str) -> Result<String> {
    let shards = read_shard_sets(inputs)?;
    let merged = consolidate(&shards)?;
    let files = merged.coverage.len();
    let merged = single_shard(name, merged);

    match output {
        Some(path) => {
            write_shard_set(path, &merged)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Ok(format!(
                "Merged {} shards ({} files) into {}\n",
                shards.len(),
                files,
                path.display()
            ))
        }
        None => Ok(to_json(&merged)?),
    }
}

/// Read the baseline and current result sets concurrently.
pub fn load_pair(config: &Config) -> Result<(Coverage, Coverage)> {
    let read = |path: &Path| {
        read_coverage(path)
            .with_context(|| format!("Failed to load coverage from {}", path.display()))
    };

    thread::scope(|s| -> Result<(Coverage, Coverage)> {
        let baseline = s.spawn(|| read(&config.baseline));
        let current = read(&config.current)?;
        let baseline = baseline
            .join()
            .map_err(|_| anyhow!("baseline reader panicked"))??;
        Ok((baseline, current))
    })
}

/// Load both revisions and diff them.
pub fn coverage_diff(config: &Config) -> Result<Option<CoverageDiff>> {
    let (baseline, current) = load_pair(config)?;
    Ok(diff(&baseline, &current, config.strip_prefix.as_deref()))
}

pub fn cmd_diff(config: &Config, style: &Style) -> Result<String> {
    let Some(diff) = coverage_diff(config)? else {
        return Ok(NO_CHANGES.to_string());
    };

    let output = match style {
        Style::Text => CoverageReport::new(diff).format(&TextFormatter),
        Style::Markdown => CoverageReport::new(diff)
            .with_heading(&config.heading)
            .format(&MarkdownFormatter),
        Style::Json => serde_json::to_string_pretty(&diff)? + "\n",
    };
    Ok(output)
}

/// Replace the pull request's coverage comment. Nothing is posted or
/// deleted when coverage did not change.
pub fn cmd_comment(config: &Config, api: &dyn CommentApi) -> Result<String> {
    let Some(diff) = coverage_diff(config)? else {
        info!("coverage unchanged, not commenting");
        return Ok(NO_CHANGES.to_string());
    };

    let body = CoverageReport::new(diff)
        .with_heading(&config.heading)
        .format(&MarkdownFormatter);
    let deleted = replace_report(api, &body)?;
    Ok(format!(
        "Posted coverage report (replaced {deleted} previous)\n"
    ))
}
