//! Error types for the audit engine and association metrics.
//!
//! Structural preconditions (audit not fitted, unknown column, degenerate
//! target) abort the call. Informational conditions such as a missing
//! feature table are not errors: they surface as `None` plus a logged warning.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by the audit engine and the association metrics.
#[derive(Debug, Error)]
pub enum AuditError {
    /// A read, extend or export operation ran before `fit`.
    #[error("the audit has not been fitted yet, call `fit` first")]
    NotFitted,

    /// One or more requested column names are absent from the dataset.
    #[error("column(s) not found in dataset: {}", .missing.join(", "))]
    InvalidSelection {
        /// Requested names that did not match any column
        missing: Vec<String>,
    },

    /// The target column has fewer than two distinct groups.
    #[error("target column '{target}' has {groups} distinct group(s), at least 2 are required")]
    DegenerateTarget { target: String, groups: usize },

    /// A rank-based test was requested on a non-numeric column.
    #[error("column '{column}' is not numeric")]
    NotNumeric { column: String },

    /// Candidate and target columns have different lengths.
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// A distribution could not be constructed for a test statistic.
    #[error("statistic could not be evaluated: {0}")]
    Statistic(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),

    /// Failure reported by a report sink during export.
    #[error(transparent)]
    Export(#[from] anyhow::Error),
}

impl AuditError {
    pub(crate) fn invalid_selection<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AuditError::InvalidSelection {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result alias used throughout the library.
pub type AuditResult<T> = std::result::Result<T, AuditError>;
