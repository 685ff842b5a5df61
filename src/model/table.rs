//! Table types.

use super::BBox;
use serde::{Deserialize, Serialize};

/// A detected tabular region and its cell matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Page the table starts on (1-indexed)
    pub page_no: u32,

    /// Position among the tables found on that page
    pub table_index: u32,

    /// Keyword-matched caption, if any
    #[serde(default)]
    pub caption: Option<String>,

    /// Unfiltered text found around the table
    #[serde(default)]
    pub surrounding_context: String,

    /// Bounding box on `page_no`
    pub bbox: BBox,

    /// Cell matrix; row 0 conventionally holds headers
    #[serde(default)]
    pub data: Vec<Vec<Option<String>>>,

    /// Regions of continuation fragments merged into this table
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub continued_on: Vec<TableRegion>,
}

/// A table fragment's footprint on a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableRegion {
    pub page_no: u32,
    pub bbox: BBox,
}

impl Table {
    /// Create a table without caption or context.
    pub fn new(page_no: u32, table_index: u32, bbox: BBox, data: Vec<Vec<Option<String>>>) -> Self {
        Self {
            page_no,
            table_index,
            caption: None,
            surrounding_context: String::new(),
            bbox,
            data,
            continued_on: Vec::new(),
        }
    }

    /// Build a table from plain string rows.
    pub fn from_rows<R, S>(page_no: u32, table_index: u32, bbox: BBox, rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let data = rows
            .into_iter()
            .map(|row| row.into_iter().map(|c| Some(c.into())).collect())
            .collect();
        Self::new(page_no, table_index, bbox, data)
    }

    /// Set the caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Set the surrounding context.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.surrounding_context = context.into();
        self
    }

    /// Number of rows, header included.
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Every region this table covers: its own plus merged continuations.
    pub fn regions(&self) -> impl Iterator<Item = TableRegion> + '_ {
        std::iter::once(TableRegion {
            page_no: self.page_no,
            bbox: self.bbox,
        })
        .chain(self.continued_on.iter().copied())
    }

    /// Whether `next` continues this table: both carry the same caption.
    pub fn is_continued_by(&self, next: &Table) -> bool {
        matches!((&self.caption, &next.caption), (Some(a), Some(b)) if a == b)
    }

    /// Append a continuation fragment, dropping its repeated header row.
    pub fn absorb(&mut self, next: Table) {
        self.data.extend(next.data.into_iter().skip(1));
        self.continued_on.push(TableRegion {
            page_no: next.page_no,
            bbox: next.bbox,
        });
        self.continued_on.extend(next.continued_on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox() -> BBox {
        BBox::new(50.0, 100.0, 400.0, 200.0)
    }

    #[test]
    fn test_from_rows() {
        let table = Table::from_rows(1, 0, bbox(), vec![vec!["h1", "h2"], vec!["a", "b"]]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.data[1][1].as_deref(), Some("b"));
    }

    #[test]
    fn test_continuation_requires_equal_captions() {
        let a = Table::from_rows(1, 0, bbox(), vec![vec!["h"]]).with_caption("Table 5.1");
        let b = Table::from_rows(2, 0, bbox(), vec![vec!["h"]]).with_caption("Table 5.1");
        let c = Table::from_rows(2, 0, bbox(), vec![vec!["h"]]);
        assert!(a.is_continued_by(&b));
        assert!(!a.is_continued_by(&c));
        assert!(!c.is_continued_by(&c.clone()));
    }

    #[test]
    fn test_absorb_skips_header_and_records_region() {
        let mut a = Table::from_rows(1, 0, bbox(), vec![vec!["k", "v"], vec!["1", "x"]]);
        let b = Table::from_rows(2, 0, bbox(), vec![vec!["k", "v"], vec!["2", "y"]]);
        a.absorb(b);
        assert_eq!(a.row_count(), 3);
        assert_eq!(a.data[2][0].as_deref(), Some("2"));
        let pages: Vec<u32> = a.regions().map(|r| r.page_no).collect();
        assert_eq!(pages, vec![1, 2]);
    }
}
