pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod github;
pub mod ingest;
pub mod merge;
pub mod model;
pub mod report;
pub mod schema;
pub mod stats;
