//! Prelude module - common imports for linksplit users
//!
//! ```rust
//! use linksplit::prelude::*;
//! ```

pub use crate::{
    split_hyperlink_column,
    split_hyperlink_column_with,
    CellAddress,
    CellRange,
    Error,
    HyperlinkSplitter,
    Result,
    SplitOptions,
    SplitReport,
    XlsxPackage,
};
