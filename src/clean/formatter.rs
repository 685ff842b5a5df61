//! Render a table matrix as one self-describing text unit.

use super::normalize::Normalizer;

pub const TABLE_START: &str = "[TECHNICAL TABLE START]";
pub const TABLE_END: &str = "[TECHNICAL TABLE END]";

/// Render a table for the generation stage.
///
/// Row 0 provides the headers and every later row becomes a
/// `ROW i: header: value | ...` line. Tables with fewer than two rows render
/// as the empty string. `normalizer` is applied to the caption only; cell
/// text and context are emitted as extracted.
pub fn format_table(
    normalizer: &Normalizer,
    matrix: &[Vec<Option<String>>],
    caption: Option<&str>,
    surrounding_context: &str,
) -> String {
    if matrix.len() < 2 {
        return String::new();
    }

    let headers: Vec<String> = matrix[0]
        .iter()
        .enumerate()
        .map(|(i, h)| non_blank(h).unwrap_or_else(|| format!("Col_{}", i)))
        .collect();

    let mut lines: Vec<String> = Vec::with_capacity(matrix.len() + 3);

    if !surrounding_context.is_empty() {
        lines.push(format!("[SURROUNDING CONTEXT]: {}", surrounding_context));
    }
    if let Some(caption) = caption.filter(|c| !c.trim().is_empty()) {
        lines.push(format!("[CAPTION: {}]", normalizer.normalize(caption)));
    }
    lines.push(TABLE_START.to_string());

    for (i, row) in matrix[1..].iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(j, value)| {
                let header = headers
                    .get(j)
                    .cloned()
                    .unwrap_or_else(|| format!("Col_{}", j + 1));
                let value = non_blank(value).unwrap_or_else(|| "N/A".to_string());
                format!("{}: {}", header, value)
            })
            .collect();
        lines.push(format!("ROW {}: {}", i + 1, cells.join(" | ")));
    }

    lines.push(TABLE_END.to_string());
    lines.join("\n")
}

/// Trimmed cell text, or `None` when missing or blank.
fn non_blank(cell: &Option<String>) -> Option<String> {
    cell.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
