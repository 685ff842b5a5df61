//! PDF extraction module.

mod backend;
mod caption;
mod extractor;
mod layout;
mod options;
mod table_detector;

pub use backend::{decode_text_simple, ContentOp, LopdfBackend, PageId, PdfBackend, PdfValue};
pub use caption::{is_caption, BandText};
pub use extractor::PdfExtractor;
pub use layout::{
    group_lines_into_blocks, group_spans_into_lines, LayoutAnalyzer, TextBlock, TextLine, TextSpan,
};
pub use options::{ErrorMode, ExtractOptions};
pub use table_detector::{DetectedTable, TableDetector, TableDetectorConfig, TableRowData};
