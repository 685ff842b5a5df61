//! Conversion of office documents to PDF before extraction.
//!
//! Converters are registered by file extension and looked up when the
//! pipeline meets a source that is not already a PDF.
//!
//! # Example
//!
//! ```no_run
//! use telechunk::convert::{ConverterRegistry, LibreOfficeConverter};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! fn main() -> telechunk::Result<()> {
//!     let mut registry = ConverterRegistry::new();
//!     registry.register(Arc::new(LibreOfficeConverter::new()));
//!
//!     let pdf = registry.convert(Path::new("TS-29.510.docx"), Path::new("/tmp/out"))?;
//!     println!("{}", pdf.display());
//!     Ok(())
//! }
//! ```

mod libreoffice;

pub use libreoffice::LibreOfficeConverter;

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Trait for converters that turn a document into a PDF.
///
/// Implement this trait to route a new input format through extraction.
pub trait PdfConverter: Send + Sync {
    /// Get the name of this converter.
    fn name(&self) -> &str;

    /// Lowercase extensions without the leading dot (e.g. `["docx"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Convert `input` into a PDF inside `out_dir`, returning its path.
    fn convert_to_pdf(&self, input: &Path, out_dir: &Path) -> Result<PathBuf>;

    /// Check if this converter supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry mapping file extensions to converters.
#[derive(Default)]
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn PdfConverter>>,
    by_name: HashMap<String, Arc<dyn PdfConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the LibreOffice converter.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(LibreOfficeConverter::new()));
        registry
    }

    /// Register a converter for all its supported extensions.
    ///
    /// A later registration for the same extension replaces the earlier one.
    pub fn register(&mut self, converter: Arc<dyn PdfConverter>) {
        for ext in converter.supported_extensions() {
            self.converters.insert(ext.to_lowercase(), converter.clone());
        }
        self.by_name.insert(converter.name().to_lowercase(), converter);
    }

    /// Get a converter by file extension.
    pub fn find(&self, ext: &str) -> Option<Arc<dyn PdfConverter>> {
        self.converters.get(&ext.to_lowercase()).cloned()
    }

    /// Get a converter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn PdfConverter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.converters.contains_key(&ext.to_lowercase())
    }

    /// Supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.converters.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Convert a file using the converter registered for its extension.
    pub fn convert(&self, input: &Path, out_dir: &Path) -> Result<PathBuf> {
        let ext = input
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::Conversion(format!("{} has no extension", input.display())))?;

        let converter = self
            .find(ext)
            .ok_or_else(|| Error::Conversion(format!("no converter for extension: {}", ext)))?;

        log::debug!("Converting {} with {}", input.display(), converter.name());
        converter.convert_to_pdf(input, out_dir)
    }
}
