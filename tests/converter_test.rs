//! Integration tests for the converter registry.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use telechunk::convert::{ConverterRegistry, LibreOfficeConverter, PdfConverter};
use telechunk::error::{Error, Result};

/// Mock converter that writes a placeholder PDF.
struct MockConverter {
    extensions: Vec<&'static str>,
    name: &'static str,
}

impl MockConverter {
    fn new(extensions: Vec<&'static str>, name: &'static str) -> Self {
        Self { extensions, name }
    }
}

impl PdfConverter for MockConverter {
    fn name(&self) -> &str {
        self.name
    }

    fn supported_extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn convert_to_pdf(&self, input: &Path, out_dir: &Path) -> Result<PathBuf> {
        let stem = input.file_stem().unwrap_or_default();
        let pdf = out_dir.join(stem).with_extension("pdf");
        fs::write(&pdf, format!("%PDF-1.4\n% converted by {}", self.name))?;
        Ok(pdf)
    }
}

#[test]
fn test_converter_registry_new() {
    let registry = ConverterRegistry::new();

    // Empty registry should support nothing
    assert!(!registry.supports("docx"));
    assert!(registry.supported_extensions().is_empty());
}

#[test]
fn test_converter_registry_with_defaults() {
    let registry = ConverterRegistry::with_defaults();

    assert!(registry.supports("docx"));
    assert!(registry.supports("DOC")); // Case insensitive
    assert!(registry.supports("odt"));
    assert!(!registry.supports("pdf"));
    assert_eq!(
        registry.supported_extensions(),
        vec!["doc", "docx", "odt", "rtf"]
    );
}

#[test]
fn test_converter_registry_register() {
    let mut registry = ConverterRegistry::new();
    registry.register(Arc::new(MockConverter::new(vec!["txt", "text"], "text")));

    assert!(registry.supports("txt"));
    assert!(registry.supports("text"));
    assert!(registry.supports("TXT"));
    assert!(registry.get_by_name("Text").is_some());
}

#[test]
fn test_later_registration_wins() {
    let mut registry = ConverterRegistry::with_defaults();
    registry.register(Arc::new(MockConverter::new(vec!["docx"], "mock-word")));

    assert_eq!(registry.find("docx").unwrap().name(), "mock-word");
    assert_eq!(registry.find("doc").unwrap().name(), "libreoffice");
}

#[test]
fn test_registry_dispatches_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = ConverterRegistry::new();
    registry.register(Arc::new(MockConverter::new(vec!["docx"], "word")));
    registry.register(Arc::new(MockConverter::new(vec!["rtf"], "rich")));

    let pdf = registry
        .convert(Path::new("specs/29510-h00.DOCX"), dir.path())
        .unwrap();
    assert_eq!(pdf, dir.path().join("29510-h00.pdf"));
    assert!(fs::read_to_string(&pdf).unwrap().contains("converted by word"));
}

#[test]
fn test_registry_convert_no_extension_error() {
    let registry = ConverterRegistry::with_defaults();
    let result = registry.convert(Path::new("noextension"), Path::new("."));
    assert!(matches!(result, Err(Error::Conversion(_))));
}

#[test]
fn test_registry_convert_unsupported_extension_error() {
    let registry = ConverterRegistry::with_defaults();
    let result = registry.convert(Path::new("test.xyz"), Path::new("."));
    assert!(matches!(result, Err(Error::Conversion(_))));
}

#[test]
fn test_libreoffice_missing_binary() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = ConverterRegistry::new();
    registry.register(Arc::new(LibreOfficeConverter::with_binary(
        dir.path().join("no-such-soffice"),
    )));

    let result = registry.convert(Path::new("TS-23.501.docx"), dir.path());
    assert!(matches!(result, Err(Error::Conversion(_))));
}
