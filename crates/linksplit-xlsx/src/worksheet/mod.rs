//! Worksheet part: scanning and column patching

mod append;
mod scan;

pub use append::ColumnAppender;
pub use scan::{HyperlinkRef, WorksheetScan};
