//! Document-level types.

use super::{Page, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An extracted source document: pages of blocks plus detected tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier: the parsed artifact's file name (`<stem>.json`)
    #[serde(default)]
    pub document_id: String,

    /// Source file name
    #[serde(default)]
    pub file_name: String,

    /// Page count reported by the source file
    #[serde(default)]
    pub total_pages: u32,

    /// Source metadata (title, author, etc.)
    #[serde(default)]
    pub metadata: Metadata,

    /// Pages in document order
    #[serde(default)]
    pub pages: Vec<Page>,

    /// Tables in extraction order
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Document {
    /// Create an empty document for a source file.
    pub fn for_source<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            document_id: document_id_for(path),
            file_name,
            total_pages: 0,
            metadata: Metadata::default(),
            pages: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_no: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.page_no == page_no)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Add a table to the document.
    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// Whether the document has neither text nor tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.pages.iter().all(|p| p.is_empty())
    }
}

/// Identifier for a source or artifact path: its stem with a `.json` extension.
pub fn document_id_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{}.json", stem)
}

/// Document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// PDF version (e.g., "1.7")
    #[serde(default)]
    pub pdf_version: String,
}
