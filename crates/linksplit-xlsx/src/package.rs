//! OOXML zip package

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::error::{XlsxError, XlsxResult};

/// Name of the part every OOXML package must carry
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Largest buffer reserved up front for a part
const MAX_SIZE_HINT: u64 = 16 * 1024 * 1024;

/// One entry of the zip package
#[derive(Debug, Clone)]
pub struct PackagePart {
    name: String,
    compression: CompressionMethod,
    is_dir: bool,
    data: Vec<u8>,
}

impl PackagePart {
    /// Part name as stored in the archive (no leading slash)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw bytes of the part
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// An XLSX package loaded fully into memory
///
/// Parts keep their archive order and compression method. Only parts
/// passed to [`XlsxPackage::replace_part`] change on write.
#[derive(Debug, Clone)]
pub struct XlsxPackage {
    parts: Vec<PackagePart>,
}

impl XlsxPackage {
    /// Read a package from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a package from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an OOXML package
        if archive.by_name(CONTENT_TYPES_PART).is_err() {
            return Err(XlsxError::InvalidFormat(format!(
                "Missing {}",
                CONTENT_TYPES_PART
            )));
        }

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            // The declared size is untrusted, so it only caps the hint
            let mut data = Vec::with_capacity(file.size().min(MAX_SIZE_HINT) as usize);
            file.read_to_end(&mut data)?;
            parts.push(PackagePart {
                name: file.name().to_string(),
                compression: file.compression(),
                is_dir: file.is_dir(),
                data,
            });
        }

        log::debug!("read package with {} parts", parts.len());
        Ok(Self { parts })
    }

    /// All parts, in archive order
    pub fn parts(&self) -> impl Iterator<Item = &PackagePart> {
        self.parts.iter()
    }

    /// Bytes of the named part, if present
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        let name = name.trim_start_matches('/');
        self.parts
            .iter()
            .find(|p| !p.is_dir && p.name == name)
            .map(|p| p.data.as_slice())
    }

    /// Bytes of the named part, or [`XlsxError::MissingPart`]
    pub fn require_part(&self, name: &str) -> XlsxResult<&[u8]> {
        self.part(name)
            .ok_or_else(|| XlsxError::MissingPart(name.to_string()))
    }

    /// Replace the bytes of an existing part
    pub fn replace_part(&mut self, name: &str, data: Vec<u8>) -> XlsxResult<()> {
        let name = name.trim_start_matches('/');
        let part = self
            .parts
            .iter_mut()
            .find(|p| !p.is_dir && p.name == name)
            .ok_or_else(|| XlsxError::MissingPart(name.to_string()))?;
        part.data = data;
        Ok(())
    }

    /// Write the package to a writer
    pub fn write<W: Write + Seek>(&self, writer: W) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);

        for part in &self.parts {
            let options = SimpleFileOptions::default().compression_method(
                match part.compression {
                    CompressionMethod::Stored => CompressionMethod::Stored,
                    _ => CompressionMethod::Deflated,
                },
            );

            if part.is_dir {
                zip.add_directory(part.name.as_str(), options)?;
            } else {
                zip.start_file(part.name.as_str(), options)?;
                zip.write_all(&part.data)?;
            }
        }

        zip.finish()?;
        Ok(())
    }

    /// Write the package into a byte buffer
    pub fn to_bytes(&self) -> XlsxResult<Vec<u8>> {
        let mut buf = std::io::Cursor::new(Vec::new());
        self.write(&mut buf)?;
        Ok(buf.into_inner())
    }
}
