//! Document extraction: pages of blocks plus captioned tables.

use std::path::{Path, PathBuf};

use crate::detect::{pdf_version_from_bytes, pdf_version_from_path};
use crate::error::Result;
use crate::model::{BBox, Document, Page, Table};

use super::backend::{LopdfBackend, PdfBackend};
use super::caption::BandText;
use super::layout::{group_lines_into_blocks, group_spans_into_lines, LayoutAnalyzer, TextLine, TextSpan};
use super::options::{ErrorMode, ExtractOptions};
use super::table_detector::TableDetector;

/// Extracts a [`Document`] from a PDF.
pub struct PdfExtractor<B: PdfBackend = LopdfBackend> {
    backend: B,
    source: PathBuf,
    options: ExtractOptions,
    header_version: Option<String>,
}

impl PdfExtractor<LopdfBackend> {
    /// Open a PDF file after checking its header.
    pub fn open<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Result<Self> {
        let path = path.as_ref();
        let version = pdf_version_from_path(path)?;
        let backend = LopdfBackend::load_file(path)?;

        Ok(Self {
            backend,
            source: path.to_path_buf(),
            options,
            header_version: Some(version),
        })
    }

    /// Load a PDF from memory; `source` names the document.
    pub fn from_bytes<P: AsRef<Path>>(data: &[u8], source: P, options: ExtractOptions) -> Result<Self> {
        let version = pdf_version_from_bytes(data)?;
        let backend = LopdfBackend::load_bytes(data)?;

        Ok(Self {
            backend,
            source: source.as_ref().to_path_buf(),
            options,
            header_version: Some(version),
        })
    }
}

impl<B: PdfBackend> PdfExtractor<B> {
    /// Wrap an existing backend.
    pub fn with_backend<P: AsRef<Path>>(backend: B, source: P, options: ExtractOptions) -> Self {
        Self {
            backend,
            source: source.as_ref().to_path_buf(),
            options,
            header_version: None,
        }
    }

    /// Number of pages in the source.
    pub fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract pages, blocks and tables.
    ///
    /// A page whose content cannot be decoded is left empty in lenient mode
    /// and fails the document in strict mode. A table detection failure
    /// anywhere in the document leaves it with no tables.
    pub fn extract(&self) -> Result<Document> {
        let mut document = Document::for_source(&self.source);
        document.metadata = self.backend.metadata();
        if document.metadata.pdf_version.is_empty() {
            document.metadata.pdf_version = self.header_version.clone().unwrap_or_default();
        }

        let pages = self.backend.pages();
        document.total_pages = pages.len() as u32;

        let analyzer = LayoutAnalyzer::new(&self.backend);
        let detector = TableDetector::new();
        let mut tables: Vec<Table> = Vec::new();
        let mut table_failure = None;

        for (&page_no, &page_id) in &pages {
            let (width, height) = self.backend.page_size(page_id);
            let mut page = Page::new(page_no, width, height);

            let spans = match analyzer.extract_page_spans(page_id, height) {
                Ok(spans) => spans,
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!(
                        "{}: skipping page {}: {}",
                        self.source.display(),
                        page_no,
                        e
                    );
                    document.add_page(page);
                    continue;
                }
                Err(e) => return Err(e),
            };

            if self.options.detect_tables && table_failure.is_none() {
                match self.detect_page_tables(&detector, &page, &spans) {
                    Ok(found) => tables.extend(found),
                    Err(e) => table_failure = Some(e),
                }
            }

            let lines = group_spans_into_lines(spans);
            for block in group_lines_into_blocks(lines) {
                if !block.is_empty() {
                    page.push_block(block.text(), block.bbox());
                }
            }

            document.add_page(page);
        }

        document.tables = match table_failure {
            Some(e) => {
                log::warn!(
                    "{}: {}; keeping no tables",
                    self.source.display(),
                    e
                );
                Vec::new()
            }
            None => self.finish_tables(tables),
        };

        log::debug!(
            "{}: {} pages, {} tables",
            self.source.display(),
            document.total_pages,
            document.tables.len()
        );

        Ok(document)
    }

    /// Detect the tables of one page and attach their caption and context.
    fn detect_page_tables(
        &self,
        detector: &TableDetector,
        page: &Page,
        spans: &[TextSpan],
    ) -> Result<Vec<Table>> {
        let detected = detector.detect(spans)?;
        if detected.is_empty() {
            return Ok(Vec::new());
        }

        let lines: Vec<TextLine> = group_spans_into_lines(spans.to_vec());
        let bands = BandText::new(&lines, page.width, page.height);

        Ok(detected
            .iter()
            .enumerate()
            .map(|(index, found)| {
                let bbox: BBox = found.bbox;
                let mut table = Table::new(page.page_no, index as u32, bbox, detector.to_matrix(found))
                    .with_context(bands.context_for(&bbox, &self.options));
                table.caption = bands.caption_for(&bbox, &self.options);
                table
            })
            .collect())
    }

    /// Apply the caption requirement and merge continuation fragments.
    fn finish_tables(&self, tables: Vec<Table>) -> Vec<Table> {
        let mut finished: Vec<Table> = Vec::new();

        for table in tables {
            if self.options.require_caption && table.caption.is_none() {
                log::debug!(
                    "{}: dropping uncaptioned table {} on page {}",
                    self.source.display(),
                    table.table_index,
                    table.page_no
                );
                continue;
            }

            match finished.last_mut() {
                Some(prev) if self.options.merge_continuations && prev.is_continued_by(&table) => {
                    log::debug!(
                        "{}: merging table on page {} into page {}",
                        self.source.display(),
                        table.page_no,
                        prev.page_no
                    );
                    prev.absorb(table);
                }
                _ => finished.push(table),
            }
        }

        finished
    }
}
