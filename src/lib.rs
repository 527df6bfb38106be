//! dataudit: univariate data audit library
//!
//! Profiles every column of a dataset into a summary table and per-feature
//! frequency tables, scores candidate features against a target
//! (chi-squared, adjusted mutual information, Kruskal-Wallis) and
//! exports the result as a linked workbook.

pub mod cli;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod utils;

pub use error::{AuditError, AuditResult};
pub use pipeline::{AuditState, DataAudit};
