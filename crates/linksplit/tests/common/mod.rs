//! Common utilities for linksplit integration tests.
//!
//! Fixtures are built in memory as minimal but complete XLSX packages, so no
//! binary files need to be checked in.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use linksplit::{CellAddress, XlsxPackage};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use zip::write::SimpleFileOptions;

pub const APP_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>linksplit tests</Application></Properties>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><u/><color rgb="FF0563C1"/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="1"><fill><patternFill patternType="none"/></fill></fills><borders count="1"><border/></borders><cellStyleXfs count="1"><xf/></cellStyleXfs><cellXfs count="2"><xf/><xf fontId="1"/></cellXfs></styleSheet>"#;

/// A hyperlink on a fixture sheet
#[derive(Debug, Clone)]
pub struct Link {
    pub reference: String,
    pub url: Option<String>,
    pub location: Option<String>,
}

impl Link {
    pub fn external(reference: &str, url: &str) -> Self {
        Self {
            reference: reference.into(),
            url: Some(url.into()),
            location: None,
        }
    }

    pub fn internal(reference: &str, location: &str) -> Self {
        Self {
            reference: reference.into(),
            url: None,
            location: Some(location.into()),
        }
    }
}

/// One worksheet of a fixture workbook
#[derive(Debug, Clone)]
pub struct SheetFixture {
    pub name: String,
    pub cells: Vec<(String, String)>,
    pub links: Vec<Link>,
    pub merges: Vec<String>,
    /// (cell, text) pairs stored in the sheet's comments part
    pub comments: Vec<(String, String)>,
}

impl SheetFixture {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            cells: Vec::new(),
            links: Vec::new(),
            merges: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn merge(mut self, range: &str) -> Self {
        self.merges.push(range.into());
        self
    }

    pub fn comment(mut self, reference: &str, text: &str) -> Self {
        self.comments.push((reference.into(), text.into()));
        self
    }

    pub fn cell(mut self, reference: &str, text: &str) -> Self {
        self.cells.push((reference.into(), text.into()));
        self
    }

    pub fn link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    fn to_xml(&self) -> String {
        let mut rows: BTreeMap<u32, Vec<(CellAddress, &str)>> = BTreeMap::new();
        let mut last = CellAddress::new(0, 0);
        for (reference, text) in &self.cells {
            let addr = CellAddress::parse(reference).unwrap();
            last = CellAddress::new(last.row.max(addr.row), last.col.max(addr.col));
            rows.entry(addr.row).or_default().push((addr, text));
        }

        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><dimension ref="A1:{}"/><sheetData>"#,
            last
        );
        for (row, mut cells) in rows {
            cells.sort_by_key(|(addr, _)| addr.col);
            xml.push_str(&format!(r#"<row r="{}">"#, row + 1));
            for (addr, text) in cells {
                xml.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    addr,
                    escape(text)
                ));
            }
            xml.push_str("</row>");
        }
        xml.push_str("</sheetData>");

        if !self.merges.is_empty() {
            xml.push_str(&format!(r#"<mergeCells count="{}">"#, self.merges.len()));
            for range in &self.merges {
                xml.push_str(&format!(r#"<mergeCell ref="{}"/>"#, range));
            }
            xml.push_str("</mergeCells>");
        }

        if !self.links.is_empty() {
            xml.push_str("<hyperlinks>");
            let mut rel = 0;
            for link in &self.links {
                let mut attrs = format!(r#"ref="{}""#, link.reference);
                if link.url.is_some() {
                    rel += 1;
                    attrs.push_str(&format!(r#" r:id="rId{}""#, rel));
                }
                if let Some(location) = &link.location {
                    attrs.push_str(&format!(r#" location="{}""#, escape(location)));
                }
                xml.push_str(&format!("<hyperlink {}/>", attrs));
            }
            xml.push_str("</hyperlinks>");
        }

        xml.push_str("</worksheet>");
        xml
    }

    fn rels_xml(&self, comments_part: &str) -> Option<String> {
        let urls: Vec<&str> = self.links.iter().filter_map(|l| l.url.as_deref()).collect();
        if urls.is_empty() && self.comments.is_empty() {
            return None;
        }

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (i, url) in urls.iter().enumerate() {
            xml.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="{}" TargetMode="External"/>"#,
                i + 1,
                escape(url)
            ));
        }
        if !self.comments.is_empty() {
            xml.push_str(&format!(
                r#"<Relationship Id="rIdComments" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments" Target="../{}"/>"#,
                comments_part.trim_start_matches("xl/")
            ));
        }
        xml.push_str("</Relationships>");
        Some(xml)
    }

    fn comments_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<comments xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><authors><author>tests</author></authors><commentList>"#,
        );
        for (reference, text) in &self.comments {
            xml.push_str(&format!(
                r#"<comment ref="{}" authorId="0"><text><t>{}</t></text></comment>"#,
                reference,
                escape(text)
            ));
        }
        xml.push_str("</commentList></comments>");
        xml
    }
}

/// Build an XLSX package from sheets; `active` is the selected tab
pub fn build_workbook(sheets: &[SheetFixture], active: usize) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
    );
    for (i, sheet) in sheets.iter().enumerate() {
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            i + 1
        ));
        if !sheet.comments.is_empty() {
            content_types.push_str(&format!(
                r#"<Override PartName="/xl/comments{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.comments+xml"/>"#,
                i + 1
            ));
        }
    }
    content_types.push_str("</Types>");
    put(&mut zip, "[Content_Types].xml", &content_types, options);

    put(
        &mut zip,
        "_rels/.rels",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#,
        options,
    );
    put(&mut zip, "docProps/app.xml", APP_XML, options);

    let mut workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><bookViews><workbookView activeTab="{}"/></bookViews><sheets>"#,
        active
    );
    let mut workbook_rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (i, sheet) in sheets.iter().enumerate() {
        workbook.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape(&sheet.name),
            i + 1,
            i + 1
        ));
        workbook_rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i + 1,
            i + 1
        ));
    }
    workbook.push_str("</sheets></workbook>");
    workbook_rels.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#,
        sheets.len() + 1
    ));

    put(&mut zip, "xl/workbook.xml", &workbook, options);
    put(&mut zip, "xl/_rels/workbook.xml.rels", &workbook_rels, options);
    put(&mut zip, "xl/styles.xml", STYLES_XML, options);

    for (i, sheet) in sheets.iter().enumerate() {
        put(
            &mut zip,
            &format!("xl/worksheets/sheet{}.xml", i + 1),
            &sheet.to_xml(),
            options,
        );
        let comments_part = format!("xl/comments{}.xml", i + 1);
        if let Some(rels) = sheet.rels_xml(&comments_part) {
            put(
                &mut zip,
                &format!("xl/worksheets/_rels/sheet{}.xml.rels", i + 1),
                &rels,
                options,
            );
        }
        if !sheet.comments.is_empty() {
            put(&mut zip, &comments_part, &sheet.comments_xml(), options);
        }
    }

    zip.finish().unwrap().into_inner()
}

fn put(
    zip: &mut zip::ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    body: &str,
    options: SimpleFileOptions,
) {
    zip.start_file(name, options).unwrap();
    zip.write_all(body.as_bytes()).unwrap();
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Text of a cell in a worksheet part
///
/// Returns `None` when the cell has no element or no value. Inline strings
/// and plain `<v>` values are both read.
pub fn cell_text(package: &XlsxPackage, part: &str, reference: &str) -> Option<String> {
    let data = package.part(part).expect("worksheet part");
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();

    let mut in_target = false;
    let mut in_text = false;
    let mut text: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf).unwrap() {
            Event::Start(e) => match e.local_name().as_ref() {
                b"c" => {
                    in_target = e
                        .attributes()
                        .flatten()
                        .any(|a| a.key.as_ref() == b"r" && a.value.as_ref() == reference.as_bytes());
                }
                b"t" | b"v" if in_target => in_text = true,
                _ => {}
            },
            Event::Text(t) if in_text => {
                let chunk = t.unescape().unwrap();
                text.get_or_insert_with(String::new).push_str(&chunk);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"c" => {
                    if in_target {
                        return text;
                    }
                }
                b"t" | b"v" => in_text = false,
                _ => {}
            },
            Event::Eof => return None,
            _ => {}
        }
        buf.clear();
    }
}

/// Every `r` attribute of the `<c>` elements in a worksheet part
pub fn cell_refs(package: &XlsxPackage, part: &str) -> Vec<String> {
    let data = package.part(part).expect("worksheet part");
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    let mut refs = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).unwrap() {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"r" {
                        refs.push(String::from_utf8_lossy(&attr.value).into_owned());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    refs
}

/// The scenario workbook: "Name" header, a linked row and an unlinked row
pub fn example_workbook() -> Vec<u8> {
    build_workbook(
        &[SheetFixture::new("Sheet1")
            .cell("A1", "Name")
            .cell("A2", "Example")
            .cell("A3", "NoLink")
            .link(Link::external("A2", "https://example.com"))],
        0,
    )
}
