//! Table-region resolution: which blocks belong to flowing text.

use std::collections::HashMap;

use crate::model::{BBox, Block, Page, Table};

/// Whether a block's center lies inside any of the given table boxes.
/// Edges count as inside.
pub fn is_inside_table(block_bbox: &BBox, table_bboxes: &[BBox]) -> bool {
    let (cx, cy) = block_bbox.center();
    table_bboxes.iter().any(|t| t.contains_point(cx, cy))
}

/// Table footprints indexed by page number.
#[derive(Debug, Clone, Default)]
pub struct TableRegions {
    by_page: HashMap<u32, Vec<BBox>>,
}

impl TableRegions {
    /// Index every region of every table, continuation fragments included.
    pub fn from_tables(tables: &[Table]) -> Self {
        let mut by_page: HashMap<u32, Vec<BBox>> = HashMap::new();
        for region in tables.iter().flat_map(Table::regions) {
            by_page.entry(region.page_no).or_default().push(region.bbox);
        }
        Self { by_page }
    }

    /// Table boxes on a page.
    pub fn on_page(&self, page_no: u32) -> &[BBox] {
        self.by_page.get(&page_no).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Blocks of `page` that are not covered by a table on that page.
    pub fn retained_blocks<'a>(&'a self, page: &'a Page) -> impl Iterator<Item = &'a Block> + 'a {
        let tables = self.on_page(page.page_no);
        page.blocks
            .iter()
            .filter(move |b| !is_inside_table(&b.bbox, tables))
    }
}
