//! Report module - tabular display and workbook export of audit results

pub mod anchors;
pub mod table;
pub mod workbook;

pub use anchors::{assign_anchors, SHEET_NAME_LIMIT};
pub use table::{export_table_csv, DisplaySink, TabularView, TerminalDisplay};
pub use workbook::*;
