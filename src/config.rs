//! Explicit run configuration. Handlers receive a [`Config`] value instead
//! of reading the environment themselves.

use std::path::PathBuf;

use crate::report::DEFAULT_HEADING;

#[derive(Debug, Clone)]
pub struct Config {
    /// Result set for the baseline revision.
    pub baseline: PathBuf,
    /// Result set for the revision under review.
    pub current: PathBuf,
    /// Directory removed from the front of displayed file names.
    pub strip_prefix: Option<String>,
    /// Heading of the Markdown report.
    pub heading: String,
}

impl Config {
    pub fn new(baseline: impl Into<PathBuf>, current: impl Into<PathBuf>) -> Self {
        Self {
            baseline: baseline.into(),
            current: current.into(),
            strip_prefix: None,
            heading: DEFAULT_HEADING.to_string(),
        }
    }

    #[must_use]
    pub fn with_strip_prefix(mut self, prefix: Option<String>) -> Self {
        self.strip_prefix = prefix.filter(|p| !p.is_empty());
        self
    }

    #[must_use]
    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = heading.into();
        self
    }
}
