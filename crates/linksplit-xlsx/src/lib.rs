//! # linksplit-xlsx
//!
//! Office Open XML package access for linksplit.
//!
//! The package is held as an ordered table of zip parts. Parts are only
//! parsed when needed and every part that is not replaced is written back
//! byte-for-byte, so a read-modify-write cycle leaves the rest of the
//! workbook untouched.

pub mod error;
pub mod package;
pub mod rels;
pub mod workbook;
pub mod worksheet;

mod xml;

pub use error::{XlsxError, XlsxResult};
pub use package::{PackagePart, XlsxPackage};
pub use rels::{Relationship, Relationships};
pub use workbook::{SheetEntry, WorkbookInfo};
pub use worksheet::{ColumnAppender, HyperlinkRef, WorksheetScan};
