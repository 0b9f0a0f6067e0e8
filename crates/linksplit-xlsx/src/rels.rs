//! Relationship parts (`_rels/*.rels`) and part-name resolution

use quick_xml::events::Event;

use crate::error::{XlsxError, XlsxResult};
use crate::xml;

/// Relationship type suffix of the main workbook part
pub const REL_OFFICE_DOCUMENT: &str = "/officeDocument";
/// Relationship type suffix of a worksheet part
pub const REL_WORKSHEET: &str = "/worksheet";
/// Relationship type suffix of a worksheet's comments part
pub const REL_COMMENTS: &str = "/comments";

/// A single `<Relationship>` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

/// The relationships of one source part
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Parse a `.rels` part
    pub fn parse(data: &[u8]) -> XlsxResult<Self> {
        let mut reader = xml::reader(data);
        let mut buf = Vec::new();
        let mut entries = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e)
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let id = xml::attr(&e, b"Id")?;
                    let rel_type = xml::attr(&e, b"Type")?;
                    let target = xml::attr(&e, b"Target")?;

                    if let (Some(id), Some(rel_type), Some(target)) = (id, rel_type, target) {
                        entries.push(Relationship {
                            id,
                            rel_type,
                            target,
                        });
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { entries })
    }

    /// Relationship with the given `Id`
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// First relationship whose type ends with `suffix`
    pub fn first_of_type(&self, suffix: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.rel_type.ends_with(suffix))
    }
}

/// Name of the relationship part belonging to `part`
///
/// `xl/worksheets/sheet1.xml` -> `xl/worksheets/_rels/sheet1.xml.rels`
pub fn rels_part_for(part: &str) -> String {
    let part = part.trim_start_matches('/');
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that owns it
///
/// Absolute targets (`/xl/...`) are package-rooted; relative ones are
/// resolved from the source part's directory, honouring `..` segments.
pub fn resolve_target(source_part: &str, target: &str) -> XlsxResult<String> {
    let mut segments: Vec<&str> = if target.starts_with('/') {
        Vec::new()
    } else {
        let source = source_part.trim_start_matches('/');
        match source.rsplit_once('/') {
            Some((dir, _)) => dir.split('/').collect(),
            None => Vec::new(),
        }
    };

    for seg in target.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(XlsxError::InvalidFormat(format!(
                        "relationship target '{}' escapes the package",
                        target
                    )));
                }
            }
            s => segments.push(s),
        }
    }

    Ok(segments.join("/"))
}
