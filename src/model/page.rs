//! Page-level types.

use super::BBox;
use serde::{Deserialize, Serialize};

/// A single page of an extracted document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub page_no: u32,

    /// Page width in points
    #[serde(default)]
    pub width: f32,

    /// Page height in points
    #[serde(default)]
    pub height: f32,

    /// Text blocks in reading order
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Page {
    /// Create an empty page with the given dimensions.
    pub fn new(page_no: u32, width: f32, height: f32) -> Self {
        Self {
            page_no,
            width,
            height,
            blocks: Vec::new(),
        }
    }

    /// Create an empty A4 page (210 x 297 mm).
    pub fn a4(page_no: u32) -> Self {
        Self::new(page_no, 595.0, 842.0)
    }

    /// Append a block, assigning it the next block id on this page.
    pub fn push_block(&mut self, text: impl Into<String>, bbox: BBox) {
        let block_id = self.blocks.len() as u32;
        self.blocks.push(Block {
            text: text.into(),
            bbox,
            block_id,
        });
    }

    /// Whether the page carries no text.
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| b.text.trim().is_empty())
    }
}

/// A unit of laid-out text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Text content, lines joined by newlines
    pub text: String,

    /// Bounding box in page space
    pub bbox: BBox,

    /// Position of the block on its page
    #[serde(default)]
    pub block_id: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_block_assigns_ids() {
        let mut page = Page::a4(1);
        page.push_block("first", BBox::new(0.0, 0.0, 10.0, 10.0));
        page.push_block("second", BBox::new(0.0, 20.0, 10.0, 30.0));
        assert_eq!(page.blocks[0].block_id, 0);
        assert_eq!(page.blocks[1].block_id, 1);
        assert!(!page.is_empty());
    }

    #[test]
    fn test_block_deserializes_without_id() {
        let block: Block =
            serde_json::from_str(r#"{"text": "Hello", "bbox": [0, 0, 1, 1]}"#).unwrap();
        assert_eq!(block.block_id, 0);
        assert_eq!(block.text, "Hello");
    }
}
