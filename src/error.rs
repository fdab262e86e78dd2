use thiserror::Error;

/// Raw input did not match the result-set shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid result set at {path}: expected {expected}")]
pub struct SchemaError {
    /// JSON path of the offending value, e.g. `$["RSpec"].coverage["a.rb"].lines[3]`.
    pub path: String,
    pub expected: String,
}

impl SchemaError {
    pub fn new(path: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            expected: expected.into(),
        }
    }
}

/// Two coverage entries disagree structurally, so they cannot describe the
/// same source revision.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    #[error("line vectors differ in length ({left} vs {right})")]
    LineCount { left: usize, right: usize },

    #[error("line {line} is executable on one side only")]
    Executability { line: usize },

    #[error("branch sets differ")]
    BranchKeys,

    #[error("outcomes of branch {branch} differ")]
    OutcomeKeys { branch: String },
}

/// A structural mismatch found while merging one file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot merge coverage for {file}: {source}")]
pub struct MergeError {
    pub file: String,
    pub source: Mismatch,
}

#[derive(Error, Debug)]
pub enum CovdeltaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CovdeltaError>;
