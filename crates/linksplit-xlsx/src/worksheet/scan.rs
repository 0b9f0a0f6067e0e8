//! Worksheet scan: used bounds and hyperlink annotations

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};

use crate::error::{XlsxError, XlsxResult};
use crate::rels::Relationships;
use crate::xml;
use linksplit_core::{CellAddress, CellRange, MAX_COLS};

/// A `<hyperlink>` element of a worksheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperlinkRef {
    /// Cells covered by the link (`ref` may be a range)
    pub range: CellRange,
    /// Relationship id holding the external target
    pub rel_id: Option<String>,
}

/// Bounds and hyperlinks of one worksheet part
///
/// Bounds cover every `<c>` element, valued or not, plus every cell a
/// hyperlink or a merged range refers to. Rows without cells do not count.
/// An empty sheet reports A1 as its last cell. Cells that only carry a
/// comment live in a separate part; see [`WorksheetScan::include_comments`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetScan {
    /// Largest used row index (0-based)
    pub max_row: u32,
    /// Largest used column index (0-based)
    pub max_col: u16,
    /// Hyperlinks in document order
    pub hyperlinks: Vec<HyperlinkRef>,
}

impl WorksheetScan {
    /// Scan a worksheet part
    pub fn scan(data: &[u8]) -> XlsxResult<Self> {
        let mut reader = xml::reader(data);
        let mut buf = Vec::new();

        let mut scan = Self {
            max_row: 0,
            max_col: 0,
            hyperlinks: Vec::new(),
        };

        let mut in_sheet_data = false;
        // 1-based number of the last row seen, 0 before the first
        let mut row_num: u32 = 0;
        // 0-based column the next unaddressed cell lands in
        let mut next_col: u32 = 0;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"sheetData" => in_sheet_data = true,
                    b"row" if in_sheet_data => {
                        row_num = Self::row_number(&e, row_num)?;
                        next_col = 0;
                    }
                    b"c" if in_sheet_data => {
                        next_col = scan.visit_cell(&e, row_num, next_col)?;
                    }
                    b"hyperlink" => scan.push_hyperlink(&e)?,
                    b"mergeCell" => scan.visit_merge(&e)?,
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"row" if in_sheet_data => {
                        row_num = Self::row_number(&e, row_num)?;
                        next_col = 0;
                    }
                    b"c" if in_sheet_data => {
                        next_col = scan.visit_cell(&e, row_num, next_col)?;
                    }
                    b"hyperlink" => scan.push_hyperlink(&e)?,
                    b"mergeCell" => scan.visit_merge(&e)?,
                    _ => {}
                },
                Event::End(e) if e.local_name().as_ref() == b"sheetData" => {
                    in_sheet_data = false;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        log::debug!(
            "scanned worksheet: last cell {}, {} hyperlinks",
            CellAddress::new(scan.max_row, scan.max_col),
            scan.hyperlinks.len()
        );
        Ok(scan)
    }

    /// Widen the bounds to the cells anchoring comments
    ///
    /// `data` is the worksheet's comments part (`xl/comments1.xml`). Each
    /// `<comment ref="..">` names a cell that exists even when the sheet
    /// holds no `<c>` element for it.
    pub fn include_comments(&mut self, data: &[u8]) -> XlsxResult<()> {
        let mut reader = xml::reader(data);
        let mut buf = Vec::new();
        let mut count = 0usize;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"comment" => {
                    if let Some(reference) = xml::attr(&e, b"ref")? {
                        let range = CellRange::parse(&reference)?;
                        self.extend_to(range.end);
                        count += 1;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        log::debug!(
            "{} comments, last cell now {}",
            count,
            CellAddress::new(self.max_row, self.max_col)
        );
        Ok(())
    }

    /// Hyperlink targets of the cells in `col`, keyed by 0-based row
    ///
    /// Links are applied in document order, so a later link over the same
    /// cell wins. Links without a relationship (internal `location` links)
    /// carry no target and clear the cell. Relationship ids that do not
    /// resolve are logged and treated the same way.
    pub fn targets_in_column(&self, col: u16, rels: &Relationships) -> BTreeMap<u32, String> {
        let mut targets = BTreeMap::new();

        for link in &self.hyperlinks {
            if col < link.range.start.col || col > link.range.end.col {
                continue;
            }

            let target = match link.rel_id.as_deref() {
                Some(id) => match rels.get(id) {
                    Some(rel) => Some(rel.target.as_str()),
                    None => {
                        log::warn!(
                            "hyperlink at {} references missing relationship '{}'",
                            link.range,
                            id
                        );
                        None
                    }
                },
                None => None,
            };

            for row in link.range.start.row..=link.range.end.row {
                match target {
                    Some(t) => {
                        targets.insert(row, t.to_string());
                    }
                    None => {
                        targets.remove(&row);
                    }
                }
            }
        }

        targets
    }

    fn row_number(e: &BytesStart<'_>, previous: u32) -> XlsxResult<u32> {
        match xml::attr_u32(e, b"r")? {
            Some(0) => Err(XlsxError::Parse("row number 0".into())),
            Some(r) => Ok(r),
            None => Ok(previous + 1),
        }
    }

    /// Record a cell's position; returns the column after it
    fn visit_cell(&mut self, e: &BytesStart<'_>, row_num: u32, next_col: u32) -> XlsxResult<u32> {
        let addr = match xml::attr(e, b"r")? {
            Some(r) => CellAddress::parse(&r).map_err(|err| {
                XlsxError::Parse(format!("Invalid cell reference '{}': {}", r, err))
            })?,
            None => {
                if next_col >= MAX_COLS as u32 {
                    return Err(XlsxError::Parse(format!(
                        "too many cells in row {}",
                        row_num.max(1)
                    )));
                }
                CellAddress::new(row_num.saturating_sub(1), next_col as u16)
            }
        };

        self.extend_to(addr);
        Ok(addr.col as u32 + 1)
    }

    /// Every cell of a merged range counts as used
    fn visit_merge(&mut self, e: &BytesStart<'_>) -> XlsxResult<()> {
        if let Some(reference) = xml::attr(e, b"ref")? {
            let range = CellRange::parse(&reference)?;
            self.extend_to(range.end);
        }
        Ok(())
    }

    fn extend_to(&mut self, addr: CellAddress) {
        self.max_row = self.max_row.max(addr.row);
        self.max_col = self.max_col.max(addr.col);
    }

    fn push_hyperlink(&mut self, e: &BytesStart<'_>) -> XlsxResult<()> {
        let Some(reference) = xml::attr(e, b"ref")? else {
            log::warn!("skipping hyperlink without a ref attribute");
            return Ok(());
        };
        let range = CellRange::parse(&reference)?;
        // A linked cell exists even without a <c> element
        self.extend_to(range.end);

        self.hyperlinks.push(HyperlinkRef {
            range,
            rel_id: xml::attr(e, b"id")?,
        });
        Ok(())
    }
}
