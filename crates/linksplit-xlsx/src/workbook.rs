//! Workbook part: sheet list and active sheet

use quick_xml::events::Event;

use crate::error::{XlsxError, XlsxResult};
use crate::package::XlsxPackage;
use crate::rels::{self, Relationships, REL_OFFICE_DOCUMENT, REL_WORKSHEET};
use crate::xml;

/// Workbook part used when `_rels/.rels` does not name one
pub const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";

/// A `<sheet>` entry of the workbook, resolved to its part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub name: String,
    pub rel_id: String,
    /// Part name of the sheet, when its relationship resolves
    pub part: Option<String>,
    /// False for chartsheets, dialogsheets and macro sheets
    pub is_worksheet: bool,
}

/// What linksplit needs to know about the workbook part
#[derive(Debug, Clone)]
pub struct WorkbookInfo {
    /// Part name of the workbook itself
    pub part: String,
    pub sheets: Vec<SheetEntry>,
    /// `activeTab` of the first workbook view, 0 when absent
    pub active_tab: usize,
}

impl WorkbookInfo {
    /// Locate and parse the workbook part of a package
    pub fn load(package: &XlsxPackage) -> XlsxResult<Self> {
        let part = Self::workbook_part_name(package)?;
        let data = package.require_part(&part)?;
        let (raw_sheets, active_tab) = Self::parse_workbook_xml(data)?;

        let rels_name = rels::rels_part_for(&part);
        let rels = match package.part(&rels_name) {
            Some(data) => Relationships::parse(data)?,
            None => return Err(XlsxError::MissingPart(rels_name)),
        };

        let mut sheets = Vec::with_capacity(raw_sheets.len());
        for (name, rel_id) in raw_sheets {
            let (sheet_part, is_worksheet) = match rels.get(&rel_id) {
                Some(rel) => (
                    Some(rels::resolve_target(&part, &rel.target)?),
                    rel.rel_type.ends_with(REL_WORKSHEET),
                ),
                None => {
                    log::warn!("sheet '{}' has no relationship '{}'", name, rel_id);
                    (None, false)
                }
            };
            sheets.push(SheetEntry {
                name,
                rel_id,
                part: sheet_part,
                is_worksheet,
            });
        }

        Ok(Self {
            part,
            sheets,
            active_tab,
        })
    }

    /// The active sheet
    ///
    /// An `activeTab` beyond the sheet list falls back to the first sheet.
    /// The sheet must be a worksheet with a resolvable part.
    pub fn active_sheet(&self) -> XlsxResult<&SheetEntry> {
        let sheet = self
            .sheets
            .get(self.active_tab)
            .or_else(|| self.sheets.first())
            .ok_or_else(|| XlsxError::InvalidFormat("workbook has no sheets".into()))?;

        if sheet.part.is_none() {
            return Err(XlsxError::MissingPart(format!(
                "part for sheet '{}' ({})",
                sheet.name, sheet.rel_id
            )));
        }
        if !sheet.is_worksheet {
            return Err(XlsxError::InvalidFormat(format!(
                "active sheet '{}' is not a worksheet",
                sheet.name
            )));
        }
        Ok(sheet)
    }

    fn workbook_part_name(package: &XlsxPackage) -> XlsxResult<String> {
        let root_rels = match package.part("_rels/.rels") {
            Some(data) => Relationships::parse(data)?,
            None => return Ok(DEFAULT_WORKBOOK_PART.to_string()),
        };

        match root_rels.first_of_type(REL_OFFICE_DOCUMENT) {
            Some(rel) => rels::resolve_target("", &rel.target),
            None => Ok(DEFAULT_WORKBOOK_PART.to_string()),
        }
    }

    /// Sheet (name, rId) pairs in tab order, plus the active tab
    fn parse_workbook_xml(data: &[u8]) -> XlsxResult<(Vec<(String, String)>, usize)> {
        let mut reader = xml::reader(data);
        let mut buf = Vec::new();
        let mut sheets = Vec::new();
        let mut active_tab = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) => match e.local_name().as_ref() {
                    b"sheet" => {
                        let name = xml::attr(&e, b"name")?;
                        let r_id = xml::attr(&e, b"id")?;
                        if let (Some(name), Some(r_id)) = (name, r_id) {
                            sheets.push((name, r_id));
                        }
                    }
                    b"workbookView" if active_tab.is_none() => {
                        active_tab = Some(xml::attr_u32(&e, b"activeTab")?.unwrap_or(0));
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok((sheets, active_tab.unwrap_or(0) as usize))
    }
}
