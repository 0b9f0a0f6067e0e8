//! Append a column of inline-string cells to a worksheet part

use std::collections::BTreeMap;
use std::iter::Peekable;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{XlsxError, XlsxResult};
use crate::xml;
use linksplit_core::{CellAddress, CellRange};

/// Writes text cells into one column of a worksheet part
///
/// The worksheet XML is streamed through unchanged except for:
/// - a `<c t="inlineStr">` appended at the end of each target row,
/// - `<row>` elements created, in order, for target rows that are missing,
/// - `spans` of touched rows and the `<dimension>` ref widened to the column.
///
/// The column must lie past every existing cell of the touched rows.
#[derive(Debug, Clone)]
pub struct ColumnAppender {
    column: u16,
    /// Cell text keyed by 0-based row
    cells: BTreeMap<u32, String>,
}

impl ColumnAppender {
    pub fn new(column: u16) -> Self {
        Self {
            column,
            cells: BTreeMap::new(),
        }
    }

    /// Set the text for a 0-based row, replacing any earlier value
    pub fn set(&mut self, row: u32, text: impl Into<String>) -> &mut Self {
        self.cells.insert(row, text.into());
        self
    }

    /// Stream `data` and return the patched worksheet part
    pub fn apply(&self, data: &[u8]) -> XlsxResult<Vec<u8>> {
        let mut reader = xml::reader(data);
        let mut writer = Writer::new(Vec::with_capacity(data.len() + self.cells.len() * 64));
        let mut buf = Vec::new();

        let mut pending = self.cells.iter().peekable();
        let mut prefix = String::new();
        let mut in_sheet_data = false;
        let mut saw_sheet_data = false;
        let mut row_num: u32 = 0;
        // Text still to be written into the currently open row
        let mut open_cell: Option<(u32, &str)> = None;

        loop {
            buf.clear();
            let event = reader.read_event_into(&mut buf)?;
            match &event {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"sheetData" => {
                        prefix = element_prefix(e)?;
                        in_sheet_data = true;
                        saw_sheet_data = true;
                        writer.write_event(&event)?;
                    }
                    b"row" if in_sheet_data => {
                        row_num = row_number(e, row_num)?;
                        let row = row_num - 1;
                        self.write_rows_before(&mut writer, &mut pending, row, &prefix)?;

                        match next_for_row(&mut pending, row) {
                            Some(text) => {
                                writer.write_event(Event::Start(self.widen_spans(e)?))?;
                                open_cell = Some((row, text));
                            }
                            None => writer.write_event(&event)?,
                        }
                    }
                    b"extLst" if open_cell.is_some() => {
                        if let Some((row, text)) = open_cell.take() {
                            self.write_cell(&mut writer, row, text, &prefix)?;
                        }
                        writer.write_event(&event)?;
                    }
                    b"dimension" => writer.write_event(Event::Start(self.widen_dimension(e)?))?,
                    _ => writer.write_event(&event)?,
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"sheetData" => {
                        prefix = element_prefix(e)?;
                        saw_sheet_data = true;
                        writer.write_event(Event::Start(e.clone()))?;
                        self.write_rows_before(&mut writer, &mut pending, u32::MAX, &prefix)?;
                        writer.write_event(Event::End(e.to_end()))?;
                    }
                    b"row" if in_sheet_data => {
                        row_num = row_number(e, row_num)?;
                        let row = row_num - 1;
                        self.write_rows_before(&mut writer, &mut pending, row, &prefix)?;

                        match next_for_row(&mut pending, row) {
                            Some(text) => {
                                let start = self.widen_spans(e)?;
                                let end = start.to_end().into_owned();
                                writer.write_event(Event::Start(start))?;
                                self.write_cell(&mut writer, row, text, &prefix)?;
                                writer.write_event(Event::End(end))?;
                            }
                            None => writer.write_event(&event)?,
                        }
                    }
                    b"extLst" if open_cell.is_some() => {
                        if let Some((row, text)) = open_cell.take() {
                            self.write_cell(&mut writer, row, text, &prefix)?;
                        }
                        writer.write_event(&event)?;
                    }
                    b"dimension" => writer.write_event(Event::Empty(self.widen_dimension(e)?))?,
                    _ => writer.write_event(&event)?,
                },
                Event::End(e) => match e.local_name().as_ref() {
                    b"row" if in_sheet_data => {
                        if let Some((row, text)) = open_cell.take() {
                            self.write_cell(&mut writer, row, text, &prefix)?;
                        }
                        writer.write_event(&event)?;
                    }
                    b"sheetData" => {
                        self.write_rows_before(&mut writer, &mut pending, u32::MAX, &prefix)?;
                        in_sheet_data = false;
                        writer.write_event(&event)?;
                    }
                    _ => writer.write_event(&event)?,
                },
                Event::Eof => break,
                _ => writer.write_event(&event)?,
            }
        }

        if !saw_sheet_data {
            return Err(XlsxError::InvalidFormat(
                "worksheet has no sheetData element".into(),
            ));
        }

        Ok(writer.into_inner())
    }

    /// Emit new `<row>` elements for pending rows before `row`
    fn write_rows_before<'c, I>(
        &self,
        writer: &mut Writer<Vec<u8>>,
        pending: &mut Peekable<I>,
        row: u32,
        prefix: &str,
    ) -> XlsxResult<()>
    where
        I: Iterator<Item = (&'c u32, &'c String)>,
    {
        while let Some((&r, text)) = pending.next_if(|&(&r, _)| r < row) {
            let name = format!("{}row", prefix);
            let row_ref = (r + 1).to_string();
            let mut start = BytesStart::new(name.as_str());
            start.push_attribute(("r", row_ref.as_str()));
            writer.write_event(Event::Start(start))?;
            self.write_cell(writer, r, text, prefix)?;
            writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
        }
        Ok(())
    }

    /// `<c r=".." t="inlineStr"><is><t>text</t></is></c>`
    fn write_cell(
        &self,
        writer: &mut Writer<Vec<u8>>,
        row: u32,
        text: &str,
        prefix: &str,
    ) -> XlsxResult<()> {
        let c = format!("{}c", prefix);
        let is = format!("{}is", prefix);
        let t = format!("{}t", prefix);
        let cell_ref = CellAddress::new(row, self.column).to_a1_string();

        let mut cell = BytesStart::new(c.as_str());
        cell.push_attribute(("r", cell_ref.as_str()));
        cell.push_attribute(("t", "inlineStr"));
        writer.write_event(Event::Start(cell))?;
        writer.write_event(Event::Start(BytesStart::new(is.as_str())))?;

        let mut text_start = BytesStart::new(t.as_str());
        if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
            text_start.push_attribute(("xml:space", "preserve"));
        }
        writer.write_event(Event::Start(text_start))?;
        writer.write_event(Event::Text(BytesText::new(text)))?;
        writer.write_event(Event::End(BytesEnd::new(t.as_str())))?;

        writer.write_event(Event::End(BytesEnd::new(is.as_str())))?;
        writer.write_event(Event::End(BytesEnd::new(c.as_str())))?;
        Ok(())
    }

    /// Copy of a `<row>` start with `spans="a:b"` reaching the new column
    fn widen_spans(&self, e: &BytesStart<'_>) -> XlsxResult<BytesStart<'static>> {
        let col = self.column as u32 + 1;
        rewrite_attr(e, b"spans", |spans| {
            let (lo, hi) = spans.split_once(':')?;
            let lo: u32 = lo.trim().parse().ok()?;
            let hi: u32 = hi.trim().parse().ok()?;
            Some(format!("{}:{}", lo.min(col), hi.max(col)))
        })
    }

    /// Copy of `<dimension ref=..>` covering the new column and rows
    fn widen_dimension(&self, e: &BytesStart<'_>) -> XlsxResult<BytesStart<'static>> {
        let last_row = self.cells.keys().next_back().copied();
        rewrite_attr(e, b"ref", |reference| {
            let range = match CellRange::parse(reference) {
                Ok(range) => range,
                Err(err) => {
                    log::warn!("leaving unparsable dimension '{}': {}", reference, err);
                    return None;
                }
            };
            let end = CellAddress::new(
                range.end.row.max(last_row.unwrap_or(0)),
                range.end.col.max(self.column),
            );
            Some(CellRange::new(range.start, end).to_a1_string())
        })
    }
}

/// Take the pending text for `row` if it is next in line
fn next_for_row<'c, I>(pending: &mut Peekable<I>, row: u32) -> Option<&'c str>
where
    I: Iterator<Item = (&'c u32, &'c String)>,
{
    pending
        .next_if(|&(&r, _)| r == row)
        .map(|(_, text)| text.as_str())
}

fn row_number(e: &BytesStart<'_>, previous: u32) -> XlsxResult<u32> {
    match xml::attr_u32(e, b"r")? {
        Some(0) => Err(XlsxError::Parse("row number 0".into())),
        Some(r) => Ok(r),
        None => Ok(previous + 1),
    }
}

/// Namespace prefix of an element, with its colon (`"x:"`), or empty
fn element_prefix(e: &BytesStart<'_>) -> XlsxResult<String> {
    Ok(match e.name().prefix() {
        Some(p) => format!(
            "{}:",
            std::str::from_utf8(p.as_ref())
                .map_err(|err| XlsxError::Parse(format!("element prefix: {}", err)))?
        ),
        None => String::new(),
    })
}

/// Clone `e`, passing the value of attribute `key` through `f`
///
/// `f` returning `None` keeps the original value.
fn rewrite_attr<F>(e: &BytesStart<'_>, key: &[u8], f: F) -> XlsxResult<BytesStart<'static>>
where
    F: FnOnce(&str) -> Option<String>,
{
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|err| XlsxError::Parse(format!("element name: {}", err)))?
        .to_string();
    let mut out = BytesStart::new(name);
    let mut f = Some(f);

    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            let value = attr.unescape_value()?;
            if let Some(new_value) = f.take().and_then(|f| f(&value)) {
                let key = std::str::from_utf8(key)
                    .map_err(|err| XlsxError::Parse(format!("attribute name: {}", err)))?;
                out.push_attribute((key, new_value.as_str()));
                continue;
            }
        }
        out.push_attribute(attr);
    }

    Ok(out.into_owned())
}
