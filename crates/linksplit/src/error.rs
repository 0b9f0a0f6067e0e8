//! Error types for linksplit

use std::path::PathBuf;

use linksplit_xlsx::XlsxError;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from splitting a hyperlink column
#[derive(Debug, Error)]
pub enum Error {
    /// The workbook file could not be read
    #[error("Failed to open '{}'", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The workbook file could not be written back
    #[error("Failed to save '{}'", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a usable XLSX package
    #[error(transparent)]
    Xlsx(#[from] XlsxError),

    /// Addressing error, e.g. no column left after XFD
    #[error(transparent)]
    Core(#[from] linksplit_core::Error),
}
