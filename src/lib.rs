//! # telechunk
//!
//! Turn telecommunications standards (3GPP, ITU, IETF, arXiv preprints)
//! into retrieval chunks.
//!
//! PDFs are reduced to positioned text blocks and tables; tables are
//! rendered as self-describing text units; the remaining prose is
//! normalized and cut into overlapping word windows tagged with the
//! document's origin.
//!
//! ## Quick Start
//!
//! ```no_run
//! use telechunk::{extract_file, build_chunks, ChunkingConfig, Normalizer};
//!
//! fn main() -> telechunk::Result<()> {
//!     // Extract positioned blocks and tables
//!     let doc = extract_file("ts_138331v170000p.pdf")?;
//!
//!     // Chunk them
//!     let chunks = build_chunks(&doc, "3GPP/Rel-17", ChunkingConfig::default(), &Normalizer::new())?;
//!     for chunk in &chunks {
//!         println!("{}", chunk.context());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Table-aware**: Text inside detected tables is excluded from prose
//! - **Captions and context**: Tables carry nearby caption and paragraph text
//! - **Batch pipeline**: Mirrored directory trees, resumable, parallel with Rayon
//! - **Archives**: Nested zip distributions unpacked in place
//! - **Office sources**: Converted to PDF through LibreOffice

pub mod archive;
pub mod clean;
pub mod config;
pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;

// Re-export commonly used types
pub use clean::{build_chunks, chunk, format_table, is_inside_table, origin, Normalizer};
pub use config::{ChunkingConfig, Settings, SourceNames};
pub use convert::{ConverterRegistry, LibreOfficeConverter, PdfConverter};
pub use detect::{classify_path, SourceKind};
pub use error::{Error, Result};
pub use model::{BBox, Block, Chunk, ChunkType, Document, Metadata, Page, Table};
pub use parser::{ErrorMode, ExtractOptions, PdfExtractor};
pub use pipeline::{process_pdf, BatchReport, CancelFlag, Pipeline};

use std::path::Path;

/// Extract a PDF file into a structured document.
///
/// # Example
///
/// ```no_run
/// use telechunk::extract_file;
///
/// let doc = extract_file("T-REC-G.989.3.pdf").unwrap();
/// println!("Pages: {}, tables: {}", doc.total_pages, doc.tables.len());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    PdfExtractor::open(path, ExtractOptions::default())?.extract()
}

/// Extract a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use telechunk::{extract_file_with_options, ExtractOptions};
///
/// let options = ExtractOptions::new().with_require_caption(true);
/// let doc = extract_file_with_options("rfc9000.pdf", options).unwrap();
/// ```
pub fn extract_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ExtractOptions,
) -> Result<Document> {
    PdfExtractor::open(path, options)?.extract()
}

/// Extract a PDF held in memory. `source` names the document.
pub fn extract_bytes<P: AsRef<Path>>(data: &[u8], source: P) -> Result<Document> {
    PdfExtractor::from_bytes(data, source, ExtractOptions::default())?.extract()
}

/// Builder for extracting and chunking single files.
///
/// # Example
///
/// ```no_run
/// use telechunk::{ChunkingConfig, Telechunk};
///
/// let chunks = Telechunk::new()
///     .with_chunking(ChunkingConfig::new(256, 32))
///     .require_caption()
///     .chunk_file("ts_129510.pdf")?;
/// # Ok::<(), telechunk::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Telechunk {
    options: ExtractOptions,
    chunking: ChunkingConfig,
    sources: SourceNames,
}

impl Telechunk {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            options: settings.extraction().clone(),
            chunking: settings.chunking(),
            sources: settings.sources.clone(),
        }
    }

    /// Fail on the first unreadable page instead of skipping it.
    pub fn strict(mut self) -> Self {
        self.options = self.options.with_error_mode(ErrorMode::Strict);
        self
    }

    /// Skip table detection.
    pub fn text_only(mut self) -> Self {
        self.options = self.options.text_only();
        self
    }

    /// Keep only tables that have a caption.
    pub fn require_caption(mut self) -> Self {
        self.options = self.options.with_require_caption(true);
        self
    }

    /// Set the chunk window.
    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    /// Set the source-name map used for origins.
    pub fn with_sources(mut self, sources: SourceNames) -> Self {
        self.sources = sources;
        self
    }

    /// Extract a file.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        PdfExtractor::open(path, self.options.clone())?.extract()
    }

    /// Extract and chunk a file; its origin comes from its path.
    pub fn chunk_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Chunk>> {
        let path = path.as_ref();
        self.chunking.validate()?;
        let document = self.extract(path)?;
        let origin = origin(path, &self.sources);
        build_chunks(&document, &origin, self.chunking, &Normalizer::new())
    }
}
