use std::io;

use thiserror::Error;

/// Fatal problems that abort a run before any matching happens. Everything
/// the loaders merely tolerate (duplicates, skipped rows, empty token sets)
/// is counted and logged instead of raised.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("{path}: missing required column \"{column}\"")]
    MissingColumn { path: String, column: &'static str },

    /// `row` is the 1-based data row, header excluded.
    #[error("{path}: row {row}: {reason}")]
    MalformedRow {
        path: String,
        row: usize,
        reason: String,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed csv in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Problems while writing the report artifact.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error while writing report: {0}")]
    Io(#[from] io::Error),
}
