//! Table detection using text position analysis (stream mode).
//!
//! Tables are found from text alignment alone: spans are grouped into rows
//! by baseline, column boundaries come from left edges that line up across
//! rows, and runs of well-aligned rows form a table region.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::model::BBox;

use super::layout::TextSpan;

/// Width of the buckets left edges are snapped to (points).
const EDGE_BUCKET: f32 = 5.0;

/// Distance within which a span counts as aligned with a column (points).
const ALIGN_TOLERANCE: f32 = 5.0;

/// A detected table region with its content.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Footprint of every span in the table
    pub bbox: BBox,
    /// Column left edges, ascending
    pub columns: Vec<f32>,
    /// Rows of spans, top to bottom
    pub rows: Vec<TableRowData>,
}

/// A row of text spans in a table.
#[derive(Debug, Clone)]
pub struct TableRowData {
    /// Mean baseline of the row
    pub y: f32,
    /// Spans in this row, sorted by X
    pub spans: Vec<TextSpan>,
}

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Y tolerance for grouping spans into rows (fraction of font size)
    pub y_tolerance_factor: f32,
    /// Minimum column alignment ratio (0.0-1.0)
    pub min_alignment_ratio: f32,
    /// Minimum gap between columns (points)
    pub min_column_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 8,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.3,
            min_column_gap: 15.0,
        }
    }
}

/// Detects tables among the spans of one page.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a new table detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables in the given spans, top to bottom.
    ///
    /// Fails with [`Error::TableParse`] when span geometry is not finite.
    pub fn detect(&self, spans: &[TextSpan]) -> Result<Vec<DetectedTable>> {
        if let Some(bad) = spans.iter().find(|s| !s.is_finite()) {
            return Err(Error::TableParse(format!(
                "non-finite geometry for span {:?}",
                bad.text
            )));
        }

        if spans.len() < self.config.min_rows * self.config.min_columns {
            return Ok(vec![]);
        }

        let rows = self.group_into_rows(spans);
        if rows.len() < self.config.min_rows {
            return Ok(vec![]);
        }

        let columns = self.detect_columns(&rows);
        log::debug!(
            "TableDetector: {} rows, candidate columns at {:?}",
            rows.len(),
            columns
        );
        if columns.len() < self.config.min_columns {
            return Ok(vec![]);
        }

        let mut tables = Vec::new();
        for (start, end) in self.find_table_regions(&rows, &columns) {
            let table_rows = rows[start..=end].to_vec();

            // Re-detect columns for this specific region
            let table_columns = self.detect_columns(&table_rows);
            if table_columns.len() < self.config.min_columns {
                continue;
            }
            if table_columns.len() > self.config.max_columns {
                log::debug!(
                    "TableDetector: skipping region, too many columns ({} > {})",
                    table_columns.len(),
                    self.config.max_columns
                );
                continue;
            }
            if self.is_list_pattern(&table_rows, &table_columns) {
                log::debug!("TableDetector: skipping region, detected as list pattern");
                continue;
            }

            let bbox = table_rows
                .iter()
                .flat_map(|r| r.spans.iter())
                .map(TextSpan::bbox)
                .reduce(|a, b| a.union(&b))
                .unwrap_or_default();

            tables.push(DetectedTable {
                bbox,
                columns: table_columns,
                rows: table_rows,
            });
        }

        Ok(tables)
    }

    /// Group spans into rows by baseline.
    fn group_into_rows(&self, spans: &[TextSpan]) -> Vec<TableRowData> {
        let mut sorted = spans.to_vec();
        sorted.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

        let mut rows: Vec<TableRowData> = Vec::new();
        let mut current: Vec<TextSpan> = Vec::new();
        let mut current_y: Option<f32> = None;

        for span in sorted {
            let y_tolerance = span.font_size * self.config.y_tolerance_factor;
            match current_y {
                Some(y) if (span.y - y).abs() <= y_tolerance => current.push(span),
                _ => {
                    if !current.is_empty() {
                        rows.push(make_row(std::mem::take(&mut current)));
                    }
                    current_y = Some(span.y);
                    current.push(span);
                }
            }
        }

        if !current.is_empty() {
            rows.push(make_row(current));
        }

        rows
    }

    /// Detect column boundaries from aligned left edges.
    ///
    /// Rows with two or more spans are the evidence; when too few exist every
    /// row is counted instead.
    fn detect_columns(&self, rows: &[TableRowData]) -> Vec<f32> {
        let multi_span_rows: Vec<&TableRowData> =
            rows.iter().filter(|r| r.spans.len() >= 2).collect();

        let evidence: Vec<&TableRowData> = if multi_span_rows.len() >= self.config.min_rows {
            multi_span_rows
        } else {
            rows.iter().collect()
        };
        if evidence.is_empty() {
            return vec![];
        }

        // Count each bucket once per row
        let mut edge_counts: HashMap<i32, usize> = HashMap::new();
        for row in &evidence {
            let buckets: HashSet<i32> = row
                .spans
                .iter()
                .map(|s| (s.x / EDGE_BUCKET).round() as i32)
                .collect();
            for bucket in buckets {
                *edge_counts.entry(bucket).or_insert(0) += 1;
            }
        }

        let min_occurrences =
            ((evidence.len() as f32 * self.config.min_alignment_ratio) as usize).max(2);

        let mut edges: Vec<i32> = edge_counts
            .into_iter()
            .filter(|(_, count)| *count >= min_occurrences)
            .map(|(bucket, _)| bucket)
            .collect();
        edges.sort_unstable();

        let mut merged: Vec<f32> = Vec::new();
        for edge in edges.into_iter().map(|b| b as f32 * EDGE_BUCKET) {
            match merged.last() {
                Some(last) if edge - last < self.config.min_column_gap => {}
                _ => merged.push(edge),
            }
        }
        merged
    }

    /// Find contiguous runs of aligned rows.
    fn find_table_regions(&self, rows: &[TableRowData], columns: &[f32]) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            let aligned = row.spans.len() >= 2
                && alignment_score(row, columns) >= self.config.min_alignment_ratio;
            match (aligned, start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    if i - s >= self.config.min_rows {
                        regions.push((s, i - 1));
                    }
                    start = None;
                }
                _ => {}
            }
        }

        if let Some(s) = start {
            if rows.len() - s >= self.config.min_rows {
                regions.push((s, rows.len() - 1));
            }
        }

        regions
    }

    /// Check if detected table rows actually represent a numbered or bulleted list.
    ///
    /// A numbered list whose markers and item text are separate spans looks
    /// like a two-column table to the detector.
    fn is_list_pattern(&self, rows: &[TableRowData], columns: &[f32]) -> bool {
        if columns.len() < 2 || rows.is_empty() {
            return false;
        }

        let mut bullet_count = 0;
        let mut number_count = 0;

        for row in rows {
            // Spans are sorted, so the first is the leftmost
            if let Some(span) = row.spans.first() {
                let text = span.text.trim();
                if is_bullet_marker(text) {
                    bullet_count += 1;
                } else if is_number_marker(text) {
                    number_count += 1;
                }
            }
        }

        let bullet_ratio = bullet_count as f32 / rows.len() as f32;
        let total_ratio = (bullet_count + number_count) as f32 / rows.len() as f32;

        // Numbered first columns are common in real tables, so only
        // two-column regions are rejected for them
        bullet_ratio >= 0.5 || (columns.len() == 2 && total_ratio >= 0.5)
    }

    /// Build the cell matrix. Row 0 holds the headers; a column no span fell
    /// into is `None`.
    pub fn to_matrix(&self, detected: &DetectedTable) -> Vec<Vec<Option<String>>> {
        let columns = &detected.columns;

        detected
            .rows
            .iter()
            .map(|row| {
                let mut cells: Vec<Vec<&str>> = vec![Vec::new(); columns.len()];
                for span in &row.spans {
                    let col = find_column_for_span(span.x, columns, detected.bbox.x1);
                    if let Some(cell) = cells.get_mut(col) {
                        cell.push(span.text.trim());
                    }
                }
                cells
                    .into_iter()
                    .map(|parts| {
                        let text = parts.join(" ");
                        if text.trim().is_empty() {
                            None
                        } else {
                            Some(text)
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

fn make_row(spans: Vec<TextSpan>) -> TableRowData {
    let y = spans.iter().map(|s| s.y).sum::<f32>() / spans.len() as f32;
    TableRowData { y, spans }
}

/// Fraction of a row's spans whose left edge sits on a column.
fn alignment_score(row: &TableRowData, columns: &[f32]) -> f32 {
    if row.spans.is_empty() || columns.is_empty() {
        return 0.0;
    }

    let aligned = row
        .spans
        .iter()
        .filter(|span| columns.iter().any(|col| (span.x - col).abs() <= ALIGN_TOLERANCE))
        .count();

    aligned as f32 / row.spans.len() as f32
}

/// Find which column a span belongs to based on its X position.
fn find_column_for_span(span_x: f32, columns: &[f32], right_x: f32) -> usize {
    // Spans may start up to 10pt before their column edge
    for (i, &col_start) in columns.iter().enumerate() {
        let col_end = columns.get(i + 1).copied().unwrap_or(right_x + 100.0);
        if span_x >= col_start - 10.0 && span_x < col_end - 10.0 {
            return i;
        }
    }

    columns
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (span_x - *a).abs().total_cmp(&(span_x - *b).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Check if text is a bullet marker (•, -, etc.).
fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "▸" | "►" | "■" | "●" | "□" | "◆" | "▶" | "➤"
    )
}

/// Check if text is a number-style list marker (1., 2), a., etc.).
fn is_number_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return false;
    }

    // "1." "12." "1)"
    if let Some(pos) = cleaned.find(|c: char| !c.is_ascii_digit()) {
        let (prefix, suffix) = cleaned.split_at(pos);
        if !prefix.is_empty() && (suffix == "." || suffix == ")") {
            return true;
        }
    }

    if cleaned.parse::<u32>().is_ok() {
        return true;
    }

    // "a." "B)"
    let chars: Vec<char> = cleaned.chars().collect();
    chars.len() == 2 && chars[0].is_alphabetic() && (chars[1] == '.' || chars[1] == ')')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan::new(text, x, y, 10.0)
    }

    fn grid() -> Vec<TextSpan> {
        vec![
            make_span("Parameter", 50.0, 100.0),
            make_span("Value", 200.0, 100.0),
            make_span("T300", 50.0, 115.0),
            make_span("1000 ms", 200.0, 115.0),
            make_span("N310", 50.0, 130.0),
            make_span("4", 200.0, 130.0),
        ]
    }

    #[test]
    fn test_group_into_rows() {
        let detector = TableDetector::new();
        let rows = detector.group_into_rows(&grid());
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.spans.len() == 2));
        assert!(rows[0].y < rows[1].y);
    }

    #[test]
    fn test_custom_min_rows() {
        let detector = TableDetector::with_config(TableDetectorConfig {
            min_rows: 4,
            ..Default::default()
        });
        assert!(detector.detect(&grid()).unwrap().is_empty());
    }

    #[test]
    fn test_detect_simple_table() {
        let detector = TableDetector::new();
        let tables = detector.detect(&grid()).unwrap();
        assert_eq!(tables.len(), 1);

        let table = &tables[0];
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.columns, vec![50.0, 200.0]);
        assert_eq!(table.bbox.x0, 50.0);
        assert_eq!(table.bbox.y0, 92.0);
        assert_eq!(table.bbox.y1, 132.0);
    }

    #[test]
    fn test_to_matrix() {
        let detector = TableDetector::new();
        let tables = detector.detect(&grid()).unwrap();
        let matrix = detector.to_matrix(&tables[0]);
        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix[0], vec![Some("Parameter".into()), Some("Value".into())]);
        assert_eq!(matrix[1][1].as_deref(), Some("1000 ms"));
    }

    #[test]
    fn test_missing_cell_is_none() {
        let detector = TableDetector::new();
        let detected = DetectedTable {
            bbox: BBox::new(50.0, 90.0, 260.0, 135.0),
            columns: vec![50.0, 200.0],
            rows: vec![
                make_row(vec![make_span("k", 50.0, 100.0), make_span("v", 200.0, 100.0)]),
                make_row(vec![make_span("only", 50.0, 115.0)]),
            ],
        };
        let matrix = detector.to_matrix(&detected);
        assert_eq!(matrix[1], vec![Some("only".into()), None]);
    }

    #[test]
    fn test_prose_is_not_a_table() {
        let detector = TableDetector::new();
        let spans = vec![
            make_span("Line 1", 10.0, 100.0),
            make_span("Line 2", 10.0, 115.0),
            make_span("Line 3", 10.0, 130.0),
            make_span("Line 4", 10.0, 145.0),
        ];
        assert!(detector.detect(&spans).unwrap().is_empty());
    }

    #[test]
    fn test_numbered_list_not_detected_as_table() {
        let detector = TableDetector::new();
        let spans = vec![
            make_span("1.", 50.0, 100.0),
            make_span("Radio resource control", 80.0, 100.0),
            make_span("2.", 50.0, 130.0),
            make_span("Packet data convergence", 80.0, 130.0),
            make_span("3.", 50.0, 160.0),
            make_span("Medium access control", 80.0, 160.0),
        ];
        assert!(detector.detect(&spans).unwrap().is_empty());
    }

    #[test]
    fn test_bullet_list_not_detected_as_table() {
        let detector = TableDetector::new();
        let spans = vec![
            make_span("•", 50.0, 100.0),
            make_span("Management", 80.0, 100.0),
            make_span("•", 50.0, 130.0),
            make_span("Interface option", 80.0, 130.0),
            make_span("•", 50.0, 160.0),
            make_span("Firmware", 80.0, 160.0),
        ];
        assert!(detector.detect(&spans).unwrap().is_empty());
    }

    #[test]
    fn test_non_finite_geometry_is_an_error() {
        let detector = TableDetector::new();
        let mut spans = grid();
        spans[3].x = f32::NAN;
        assert!(matches!(detector.detect(&spans), Err(Error::TableParse(_))));
    }

    #[test]
    fn test_list_markers() {
        for marker in ["1.", "12.", "1)", "1 .", "3", "a.", "B)"] {
            assert!(is_number_marker(marker), "{marker}");
        }
        for marker in ["-", "•", "*", "–"] {
            assert!(is_bullet_marker(marker), "{marker}");
        }
        for text in ["Name", "T300", "Hello World", ""] {
            assert!(!is_number_marker(text) && !is_bullet_marker(text), "{text}");
        }
    }
}
