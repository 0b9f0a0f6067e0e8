//! # linksplit-core
//!
//! Cell addressing primitives shared by the linksplit crates.
//!
//! - [`CellAddress`] - a single cell in A1 notation, with base-26 column letters
//! - [`CellRange`] - a rectangular block of cells (`A2:A10`)
//!
//! ## Example
//!
//! ```rust
//! use linksplit_core::CellAddress;
//!
//! let addr = CellAddress::parse("Z7").unwrap();
//! assert_eq!(addr.next_column().unwrap().to_string(), "AA7");
//! ```

pub mod address;
pub mod error;

pub use address::{CellAddress, CellRange};
pub use error::{Error, Result};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
