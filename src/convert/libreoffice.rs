//! Office-to-PDF conversion through a headless LibreOffice.

use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::PdfConverter;

#[cfg(windows)]
const DEFAULT_BINARY: &str = "soffice";
#[cfg(not(windows))]
const DEFAULT_BINARY: &str = "libreoffice";

const EXTENSIONS: &[&str] = &["doc", "docx", "rtf", "odt"];

/// Converter that shells out to `libreoffice --headless --convert-to pdf`.
#[derive(Debug, Clone)]
pub struct LibreOfficeConverter {
    binary: PathBuf,
}

impl LibreOfficeConverter {
    /// Use the platform's default binary name from `PATH`.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_BINARY),
        }
    }

    /// Use a specific binary.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for LibreOfficeConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfConverter for LibreOfficeConverter {
    fn name(&self) -> &str {
        "libreoffice"
    }

    fn supported_extensions(&self) -> &[&str] {
        EXTENSIONS
    }

    fn convert_to_pdf(&self, input: &Path, out_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(out_dir)?;

        let output = Command::new(&self.binary)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(out_dir)
            .arg(input)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    Error::Conversion(format!("{} not found", self.binary.display()))
                }
                _ => Error::Conversion(format!("{}: {}", self.binary.display(), e)),
            })?;

        if !output.status.success() {
            return Err(Error::Conversion(format!(
                "{} exited with {} for {}: {}",
                self.binary.display(),
                output.status,
                input.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stem = input
            .file_stem()
            .ok_or_else(|| Error::Conversion(format!("{} has no file name", input.display())))?;
        let pdf = out_dir.join(stem).with_extension("pdf");
        if !pdf.exists() {
            return Err(Error::Conversion(format!(
                "{} produced no PDF for {}",
                self.binary.display(),
                input.display()
            )));
        }

        log::debug!("Converted {} -> {}", input.display(), pdf.display());
        Ok(pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_conversion_error() {
        let dir = tempfile::tempdir().unwrap();
        let converter = LibreOfficeConverter::with_binary("/nonexistent/libreoffice-bin");
        let result = converter.convert_to_pdf(Path::new("TS-23.501.docx"), dir.path());
        match result {
            Err(Error::Conversion(msg)) => assert!(msg.contains("not found")),
            other => panic!("expected conversion error, got {:?}", other),
        }
    }

    #[test]
    fn test_supported_extensions() {
        let converter = LibreOfficeConverter::new();
        assert!(converter.supports_extension("RTF"));
        assert!(!converter.supports_extension("pdf"));
    }
}
