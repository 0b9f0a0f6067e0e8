//! Hyperlink column splitting

use std::fs;
use std::io::{self, Cursor, Read, Seek};
use std::path::Path;

use crate::error::{Error, Result};
use linksplit_core::CellAddress;
use linksplit_xlsx::rels::{self, Relationships};
use linksplit_xlsx::{ColumnAppender, WorkbookInfo, WorksheetScan, XlsxError, XlsxPackage};

/// Header written to row 1 of the new column by default
pub const DEFAULT_HEADER: &str = "Hyperlink";

/// Options for [`HyperlinkSplitter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    /// Text of the new column's row-1 cell
    pub header: String,
    /// Column whose hyperlinks are read (0-based, default A)
    pub source_column: u16,
    /// First data row (1-based, default 2). Row 1 always holds the header.
    pub first_data_row: u32,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            source_column: 0,
            first_data_row: 2,
        }
    }
}

/// Outcome of one split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReport {
    /// Name of the active sheet that was patched
    pub sheet: String,
    /// Address of the new column's header cell
    pub header_cell: CellAddress,
    /// Data rows inspected
    pub rows_scanned: u32,
    /// Hyperlink targets written
    pub links_copied: usize,
}

impl SplitReport {
    /// Letters of the new column
    pub fn column_letters(&self) -> String {
        self.header_cell.column_letters()
    }
}

/// Appends a column of hyperlink targets to the active worksheet
#[derive(Debug, Clone, Default)]
pub struct HyperlinkSplitter {
    options: SplitOptions,
}

impl HyperlinkSplitter {
    pub fn new(options: SplitOptions) -> Self {
        Self { options }
    }

    /// Split a package read from `reader`, returning the new package bytes
    pub fn split<R: Read + Seek>(&self, reader: R) -> Result<(Vec<u8>, SplitReport)> {
        let mut package = XlsxPackage::read(reader)?;
        let report = self.split_package(&mut package)?;
        Ok((package.to_bytes()?, report))
    }

    /// Split a package in memory
    ///
    /// The package is only modified once the patched worksheet has been
    /// built, so an error leaves it as it was.
    pub fn split_package(&self, package: &mut XlsxPackage) -> Result<SplitReport> {
        let workbook = WorkbookInfo::load(package)?;
        let sheet = workbook.active_sheet()?;
        let part = sheet
            .part
            .clone()
            .ok_or_else(|| XlsxError::MissingPart(format!("part for sheet '{}'", sheet.name)))?;
        log::debug!("active sheet '{}' at {}", sheet.name, part);

        let data = package.require_part(&part)?;
        let mut scan = WorksheetScan::scan(data)?;

        let sheet_rels = match package.part(&rels::rels_part_for(&part)) {
            Some(rels_data) => Relationships::parse(rels_data)?,
            None => Relationships::default(),
        };
        if let Some(rel) = sheet_rels.first_of_type(rels::REL_COMMENTS) {
            let comments_part = rels::resolve_target(&part, &rel.target)?;
            match package.part(&comments_part) {
                Some(comments) => scan.include_comments(comments)?,
                None => log::warn!("comments part {} is missing", comments_part),
            }
        }

        let header_cell = CellAddress::new(0, scan.max_col).next_column()?;
        let targets = scan.targets_in_column(self.options.source_column, &sheet_rels);

        let mut appender = ColumnAppender::new(header_cell.col);
        appender.set(header_cell.row, self.options.header.as_str());

        // Row 1 belongs to the header whatever the options say
        let first = self.options.first_data_row.saturating_sub(1).max(1);
        let rows_scanned = (scan.max_row + 1).saturating_sub(first);
        let mut links_copied = 0;

        for row in first..=scan.max_row {
            if let Some(target) = targets.get(&row) {
                appender.set(row, target.as_str());
                links_copied += 1;
            }
        }

        log::debug!(
            "writing column {} ({} of {} rows linked)",
            header_cell.column_letters(),
            links_copied,
            rows_scanned
        );

        let patched = appender.apply(data)?;
        package.replace_part(&part, patched)?;

        Ok(SplitReport {
            sheet: sheet.name.clone(),
            header_cell,
            rows_scanned,
            links_copied,
        })
    }

    /// Split the workbook at `path`, overwriting it
    ///
    /// The file is read fully and the new package is built in memory
    /// before anything is written, so open and format errors leave it
    /// untouched.
    pub fn split_file<P: AsRef<Path>>(&self, path: P) -> Result<SplitReport> {
        self.split_file_with(path.as_ref(), |path, output| fs::write(path, output))
    }

    /// [`Self::split_file`] with the final write done by `save`
    fn split_file_with<F>(&self, path: &Path, save: F) -> Result<SplitReport>
    where
        F: FnOnce(&Path, &[u8]) -> io::Result<()>,
    {
        let bytes = fs::read(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let (output, report) = self.split(Cursor::new(bytes))?;

        save(path, &output).map_err(|source| Error::Save {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!(
            "{}: copied {} hyperlinks into column {} of '{}'",
            path.display(),
            report.links_copied,
            report.column_letters(),
            report.sheet
        );
        Ok(report)
    }
}

/// Append a "Hyperlink" column holding the column-A hyperlink targets of
/// the active sheet, saving the workbook in place
pub fn split_hyperlink_column<P: AsRef<Path>>(path: P) -> Result<SplitReport> {
    HyperlinkSplitter::default().split_file(path)
}

/// [`split_hyperlink_column`] with explicit options
pub fn split_hyperlink_column_with<P: AsRef<Path>>(
    path: P,
    options: &SplitOptions,
) -> Result<SplitReport> {
    HyperlinkSplitter::new(options.clone()).split_file(path)
}
