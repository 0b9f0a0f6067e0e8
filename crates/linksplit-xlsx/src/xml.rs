//! Small quick-xml helpers shared by the part parsers

use quick_xml::events::BytesStart;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};

/// Reader over a part's bytes, keeping whitespace intact
pub(crate) fn reader(data: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(data);
    reader.trim_text(false);
    reader
}

/// Unescaped value of the attribute whose local name is `local`
///
/// Matching on the local name lets `r:id` be found whatever prefix the
/// producer bound to the relationships namespace.
pub(crate) fn attr(e: &BytesStart<'_>, local: &[u8]) -> XlsxResult<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == local {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Like [`attr`], parsed as a number
///
/// A value that is present but not a number is [`XlsxError::Parse`].
pub(crate) fn attr_u32(e: &BytesStart<'_>, local: &[u8]) -> XlsxResult<Option<u32>> {
    match attr(e, local)? {
        Some(value) => value.trim().parse().map(Some).map_err(|_| {
            XlsxError::Parse(format!(
                "invalid number '{}' in attribute '{}'",
                value,
                String::from_utf8_lossy(local)
            ))
        }),
        None => Ok(None),
    }
}
