//! Input classification: PDF header sniffing and extension-based routing.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Extensions handed to an external office converter before extraction.
const OFFICE_EXTENSIONS: &[&str] = &["doc", "docx", "rtf", "odt"];

/// What kind of raw input a file under the raw-data root is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// A PDF, ready for extraction
    Pdf,
    /// An office document that needs conversion first (lowercased extension)
    Office(String),
    /// A zip archive, possibly nested
    Archive,
    /// Anything else; ignored by the pipeline
    Other,
}

/// Classify a path by its extension (case-insensitive).
pub fn classify_path<P: AsRef<Path>>(path: P) -> SourceKind {
    let ext = path
        .as_ref()
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => SourceKind::Pdf,
        "zip" => SourceKind::Archive,
        e if OFFICE_EXTENSIONS.contains(&e) => SourceKind::Office(ext),
        _ => SourceKind::Other,
    }
}

/// Read the PDF version from a file header.
pub fn pdf_version_from_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 16];
    let n = file.read(&mut header)?;
    pdf_version_from_bytes(&header[..n])
}

/// Read the PDF version (e.g. "1.7") from the first bytes of a file.
pub fn pdf_version_from_bytes(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    let chars: Vec<char> = version.chars().collect();
    let valid = chars.len() == 3
        && chars[0].is_ascii_digit()
        && chars[1] == '.'
        && chars[2].is_ascii_digit();
    if !valid {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(version)
}
