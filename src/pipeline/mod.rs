//! Pipeline module - dataset loading, the audit engine and association metrics

pub mod association;
pub mod audit;
pub mod contingency;
pub mod correlation;
pub mod frequency;
pub mod loader;
pub mod stats;
pub mod summary;
pub mod values;

pub use association::*;
pub use audit::*;
pub use contingency::ContingencyTable;
pub use correlation::*;
pub use frequency::*;
pub use loader::*;
pub use summary::*;
pub use values::{CellValue, MISSING_TOKEN};
