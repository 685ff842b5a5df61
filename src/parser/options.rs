//! Extraction options.

use serde::{Deserialize, Serialize};

/// Options for extracting blocks and tables from PDF documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Height of the caption search band above and below a table (points)
    pub caption_band_height: f32,

    /// Horizontal padding added to the caption search band (points)
    pub caption_padding: f32,

    /// Height of the context band above and below a table (points)
    pub context_band_height: f32,

    /// Lowercase markers that identify a caption
    pub caption_keywords: Vec<String>,

    /// Drop tables for which no caption was found
    pub require_caption: bool,

    /// Merge consecutive tables sharing an identical caption
    pub merge_continuations: bool,

    /// Whether to detect tables at all
    pub detect_tables: bool,
}

impl ExtractOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable lenient mode (skip undecodable pages).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Only keep tables that have a caption.
    pub fn with_require_caption(mut self, require: bool) -> Self {
        self.require_caption = require;
        self
    }

    /// Replace the caption keywords.
    pub fn with_caption_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.caption_keywords = keywords
            .into_iter()
            .map(|k| k.into().to_lowercase())
            .collect();
        self
    }

    /// Skip table detection; every block becomes flowing text.
    pub fn text_only(mut self) -> Self {
        self.detect_tables = false;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            caption_band_height: 20.0,
            caption_padding: 50.0,
            context_band_height: 75.0,
            caption_keywords: vec!["table".to_string(), "bảng".to_string()],
            require_caption: false,
            merge_continuations: true,
            detect_tables: true,
        }
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Fail the document on any page error
    Strict,
    /// Log page errors and continue with the remaining pages
    #[default]
    Lenient,
}
