//! Output formatting for coverage diffs.

use std::fmt::Write;

use crate::model::{CoverageDiff, Stats, StatsDiff};

/// Token embedded in every Markdown report so stale reports can be found
/// and deleted later.
pub const REPORT_MARKER: &str = "f1bb63e2-a587-45a5-8f5d-c328b35eb289";

/// Default heading for Markdown reports.
pub const DEFAULT_HEADING: &str = "Test Coverage";

/// A coverage diff ready to be formatted.
pub struct CoverageReport {
    pub diff: CoverageDiff,
    /// Heading used by the Markdown formatter.
    pub heading: String,
}

impl CoverageReport {
    #[must_use]
    pub fn new(diff: CoverageDiff) -> Self {
        Self {
            diff,
            heading: DEFAULT_HEADING.to_string(),
        }
    }

    #[must_use]
    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = heading.into();
        self
    }

    /// Format using a specific formatter.
    #[must_use]
    pub fn format(&self, formatter: &dyn ReportFormatter) -> String {
        formatter.format(self)
    }
}

/// Trait for formatting coverage reports.
pub trait ReportFormatter {
    /// Format the report to a string.
    fn format(&self, report: &CoverageReport) -> String;
}

/// Plain text formatter.
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &CoverageReport) -> String {
        let diff = &report.diff;
        let branches = diff.includes_branches;
        let mut out = String::new();

        let mut columns = vec!["FILE", "LINES", "COVERED", "LINE %"];
        if branches {
            columns.extend(["BRANCHES", "COVERED", "BRANCH %"]);
        }
        let header = text_row(&columns);
        writeln!(out, "{header}").unwrap();
        writeln!(out, "{}", "-".repeat(header.len())).unwrap();

        for file in &diff.file_diffs {
            let cells = cells(branches, &file.filename, &file.stats_diff());
            writeln!(out, "{}", text_row(&cells)).unwrap();
        }

        writeln!(out, "{}", "-".repeat(header.len())).unwrap();
        let totals = cells(branches, "Totals", &diff.total_diff);
        writeln!(out, "{}", text_row(&totals)).unwrap();

        out
    }
}

fn text_row<S: AsRef<str>>(cells: &[S]) -> String {
    let mut row = String::new();
    for (i, cell) in cells.iter().enumerate() {
        let cell = cell.as_ref();
        if i == 0 {
            write!(row, "{cell:<50}").unwrap();
        } else {
            write!(row, " {cell:>18}").unwrap();
        }
    }
    row.trim_end().to_string()
}

/// Markdown formatter, suitable for a pull request comment.
pub struct MarkdownFormatter;

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &CoverageReport) -> String {
        let diff = &report.diff;
        let branches = diff.includes_branches;
        let mut md = String::new();

        writeln!(md, "<!-- {REPORT_MARKER} marker so we can delete -->").unwrap();
        writeln!(md, "## {}\n", report.heading).unwrap();

        md.push_str(&markdown_header(branches));
        let totals = cells(branches, "**Totals**", &diff.total_diff);
        writeln!(md, "|{}|", totals.join("|")).unwrap();

        md.push_str("\n<details>\n<summary>File Changes</summary>\n\n");
        md.push_str(&markdown_header(branches));
        for file in &diff.file_diffs {
            let label = format!("`{}`", file.filename);
            let row = cells(branches, &label, &file.stats_diff());
            writeln!(md, "|{}|", row.join("|")).unwrap();
        }
        md.push_str("\n</details>\n");

        md
    }
}

fn markdown_header(branches: bool) -> String {
    let mut header = String::from("| |Lines|Lines Covered|Line Coverage|");
    let mut align = String::from("|:-|:-:|:-:|:-:|");
    if branches {
        header.push_str("Branches|Branches Covered|Branch Coverage|");
        align.push_str(":-:|:-:|:-:|");
    }
    format!("{header}\n{align}\n")
}

/// Label followed by the line columns and, when requested, the branch
/// columns. Missing branch data reads as zero.
fn cells(branches: bool, label: &str, diff: &StatsDiff) -> Vec<String> {
    let StatsDiff { baseline, current } = diff;
    let count = |f: fn(&Stats) -> u64| {
        change(baseline.as_ref().map(|b| f(b) as f64), f(current) as f64, "", 0)
    };

    let mut cells = vec![
        label.to_string(),
        count(|s| s.lines),
        count(|s| s.lines_covered),
        change(
            baseline.map(|b| b.line_percentage()),
            current.line_percentage(),
            "%",
            2,
        ),
    ];

    if branches {
        cells.push(count(|s| s.branches.unwrap_or_default().branches));
        cells.push(count(|s| s.branches.unwrap_or_default().branches_covered));
        cells.push(change(
            baseline.map(|b| b.branch_percentage()),
            current.branch_percentage(),
            "%",
            2,
        ));
    }

    cells
}

/// Render `current`, followed by the signed delta from `baseline` when it
/// is non-zero. A missing baseline counts the whole value as the delta.
#[must_use]
pub fn change(baseline: Option<f64>, current: f64, unit: &str, places: usize) -> String {
    let delta = baseline.map_or(current, |b| current - b);
    let current = format_number(current, places);
    if delta == 0.0 {
        return format!("{current}{unit}");
    }
    let sign = if delta > 0.0 { "+" } else { "" };
    let delta = format_number(delta, places);
    format!("{current}{unit} ({sign}{delta}{unit})")
}

/// Round to `places` decimals and drop trailing zeros, e.g. `12.50` → `12.5`.
#[must_use]
pub fn format_number(value: f64, places: usize) -> String {
    let mut s = format!("{value:.places$}");
    if s.contains('.') {
        s.truncate(s.trim_end_matches('0').trim_end_matches('.').len());
    }
    if s == "-0" {
        s.remove(0);
    }
    s
}
