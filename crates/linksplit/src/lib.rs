//! # linksplit
//!
//! Copies the hyperlink targets stored on column-A cells of a spreadsheet
//! into a new plain-text column.
//!
//! The active worksheet of an XLSX workbook gets one column appended right
//! after its last used column. Row 1 of that column reads `Hyperlink`; each
//! later row holds the target URL of the column-A cell in the same row, or
//! stays empty when that cell carries no link. Everything else in the file
//! is written back unchanged.
//!
//! ## Example
//!
//! ```rust,no_run
//! use linksplit::prelude::*;
//!
//! let report = split_hyperlink_column("links.xlsx").unwrap();
//! println!("{} links copied into column {}", report.links_copied, report.column_letters());
//! ```
//!
//! Running it twice appends a second column; earlier output is not detected.

pub mod error;
pub mod prelude;
pub mod splitter;

pub use error::{Error, Result};
pub use splitter::{
    split_hyperlink_column, split_hyperlink_column_with, HyperlinkSplitter, SplitOptions,
    SplitReport, DEFAULT_HEADER,
};

// Re-export core types
pub use linksplit_core::{CellAddress, CellRange, MAX_COLS, MAX_ROWS};

// Re-export I/O types
pub use linksplit_xlsx::{WorkbookInfo, WorksheetScan, XlsxError, XlsxPackage};
