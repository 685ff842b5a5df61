//! Layout analysis for PDF pages.
//!
//! Walks a page's content stream, producing positioned text spans, then
//! groups spans into lines by baseline and lines into blocks by spacing,
//! indentation and font-size change. All coordinates produced here are in
//! top-left page space (y grows downward).

use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::model::BBox;

use super::backend::{ContentOp, PageId, PdfBackend, PdfValue};

/// Average glyph advance as a fraction of the font size.
const GLYPH_WIDTH_FACTOR: f32 = 0.5;

/// Default leading used by `T*` when no `TL` was set.
const DEFAULT_LEADING: f32 = 12.0;

/// A run of text with position and size.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content, NFC-normalized
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Baseline, measured from the top of the page
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
}

impl TextSpan {
    /// Create a span, estimating its width from the character count.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32) -> Self {
        let text: String = text.into().nfc().collect();
        let width = text.chars().count() as f32 * font_size * GLYPH_WIDTH_FACTOR;
        Self {
            text,
            x,
            y,
            width,
            font_size,
        }
    }

    /// Top edge (approximate ascender).
    pub fn top(&self) -> f32 {
        self.y - self.font_size * 0.8
    }

    /// Bottom edge (approximate descender).
    pub fn bottom(&self) -> f32 {
        self.y + self.font_size * 0.2
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bbox(&self) -> BBox {
        BBox::new(self.x, self.top(), self.right(), self.bottom())
    }

    /// Whether every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.font_size.is_finite()
    }
}

/// A text line composed of spans on the same baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Baseline
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size in this line
    pub font_size: f32,
}

impl TextLine {
    /// Create a line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        if spans.is_empty() {
            return Self {
                spans: vec![],
                y: 0.0,
                x: 0.0,
                font_size: 0.0,
            };
        }

        spans.sort_by(|a, b| a.x.total_cmp(&b.x));

        // Dominant font size, weighted by text length
        let total_chars: usize = spans.iter().map(|s| s.text.len()).sum();
        let weighted_size: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.len() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted_size / total_chars as f32
        } else {
            spans[0].font_size
        };

        let y = spans[0].y;
        let x = spans[0].x;

        Self {
            spans,
            y,
            x,
            font_size,
        }
    }

    /// Combined text of all spans.
    ///
    /// Inserts a space where the gap between spans is wider than a fifth of a
    /// character, except between characters of spaceless scripts.
    pub fn text(&self) -> String {
        join_spans(self.spans.iter())
    }

    pub fn bbox(&self) -> BBox {
        self.spans
            .iter()
            .map(TextSpan::bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default()
    }
}

/// Join spans into one string with gap-based spacing.
pub fn join_spans<'a, I>(spans: I) -> String
where
    I: IntoIterator<Item = &'a TextSpan>,
{
    let mut result = String::new();
    let mut prev: Option<&TextSpan> = None;

    for span in spans {
        if let Some(prev_span) = prev {
            let gap = span.x - prev_span.right();

            let char_count = span.text.chars().count();
            let avg_char_width = if char_count > 0 && span.width > 0.0 {
                span.width / char_count as f32
            } else {
                span.font_size * GLYPH_WIDTH_FACTOR
            };

            let prev_spaceless = prev_span
                .text
                .chars()
                .last()
                .map(is_spaceless_script_char)
                .unwrap_or(false);
            let curr_spaceless = span
                .text
                .chars()
                .next()
                .map(is_spaceless_script_char)
                .unwrap_or(false);

            let prev_ends_with_space =
                prev_span.text.ends_with(' ') || prev_span.text.ends_with('\u{00A0}');
            let curr_starts_with_space =
                span.text.starts_with(' ') || span.text.starts_with('\u{00A0}');

            if gap > avg_char_width * 0.2
                && !(prev_spaceless && curr_spaceless)
                && !prev_ends_with_space
                && !curr_starts_with_space
            {
                result.push(' ');
            }
        }
        result.push_str(&span.text);
        prev = Some(span);
    }

    result
}

/// A block of consecutive lines.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    /// Block text: line texts joined by newlines.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(TextLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn bbox(&self) -> BBox {
        self.lines
            .iter()
            .map(TextLine::bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.text().trim().is_empty())
    }
}

/// Extracts positioned spans from pages of a [`PdfBackend`].
pub struct LayoutAnalyzer<'a, B: PdfBackend> {
    backend: &'a B,
}

impl<'a, B: PdfBackend> LayoutAnalyzer<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Extract all text spans from a page, in top-left page space.
    pub fn extract_page_spans(&self, page_id: PageId, page_height: f32) -> Result<Vec<TextSpan>> {
        let content = self.backend.page_content(page_id)?;
        let ops = self.backend.decode_content(&content)?;
        Ok(self.spans_from_operations(page_id, &ops, page_height))
    }

    /// Interpret text operators, tracking the text matrix.
    fn spans_from_operations(
        &self,
        page_id: PageId,
        ops: &[ContentOp],
        page_height: f32,
    ) -> Vec<TextSpan> {
        let mut spans = Vec::new();
        let mut font_name: Vec<u8> = Vec::new();
        let mut font_size: f32 = 12.0;
        let mut leading = DEFAULT_LEADING;
        let mut matrix = TextMatrix::default();
        let mut in_text_object = false;

        for op in ops {
            match op.operator.as_str() {
                "BT" => {
                    in_text_object = true;
                    matrix = TextMatrix::default();
                }
                "ET" => in_text_object = false,
                "Tf" => {
                    if let Some(PdfValue::Name(name)) = op.operands.first() {
                        font_name = name.clone();
                    }
                    font_size = op.number(1).unwrap_or(12.0);
                }
                "TL" => leading = op.number(0).unwrap_or(DEFAULT_LEADING),
                "Td" => {
                    matrix.translate(op.number(0).unwrap_or(0.0), op.number(1).unwrap_or(0.0));
                }
                "TD" => {
                    let ty = op.number(1).unwrap_or(0.0);
                    leading = -ty;
                    matrix.translate(op.number(0).unwrap_or(0.0), ty);
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        matrix.set(
                            op.number(0).unwrap_or(1.0),
                            op.number(1).unwrap_or(0.0),
                            op.number(2).unwrap_or(0.0),
                            op.number(3).unwrap_or(1.0),
                            op.number(4).unwrap_or(0.0),
                            op.number(5).unwrap_or(0.0),
                        );
                    }
                }
                "T*" => matrix.translate(0.0, -leading),
                "Tj" | "TJ" | "'" | "\"" if in_text_object => {
                    if op.operator == "'" || op.operator == "\"" {
                        matrix.translate(0.0, -leading);
                    }
                    let text = self.shown_text(page_id, &font_name, op);
                    if text.trim().is_empty() {
                        continue;
                    }
                    let (x, y) = matrix.position();
                    let size = font_size * matrix.scale();
                    let span = TextSpan::new(text, x, page_height - y, size);
                    matrix.advance(span.width);
                    spans.push(span);
                }
                _ => {}
            }
        }

        spans
    }

    /// Decode the string operand(s) of a text-showing operator.
    fn shown_text(&self, page_id: PageId, font_name: &[u8], op: &ContentOp) -> String {
        let decode = |bytes: &[u8]| self.backend.decode_text(page_id, font_name, bytes);

        match op.operator.as_str() {
            "TJ" => {
                let Some(PdfValue::Array(items)) = op.operands.first() else {
                    return String::new();
                };
                // Kerning beyond 200 thousandths of an em reads as a word gap
                let space_threshold = 200.0;
                let mut combined = String::new();
                for item in items {
                    match item {
                        PdfValue::Str(bytes) => combined.push_str(&decode(bytes)),
                        other => {
                            let adjustment = -other.as_number().unwrap_or(0.0);
                            let ends_spaced = combined.ends_with(' ')
                                || combined.ends_with('\u{00A0}')
                                || combined.chars().last().map_or(true, is_spaceless_script_char);
                            if adjustment > space_threshold && !ends_spaced {
                                combined.push(' ');
                            }
                        }
                    }
                }
                combined
            }
            _ => {
                let idx = if op.operator == "\"" { 2 } else { 0 };
                match op.operands.get(idx) {
                    Some(PdfValue::Str(bytes)) => decode(bytes),
                    _ => String::new(),
                }
            }
        }
    }
}

/// Group spans into lines by baseline.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    spans.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

/// Group lines into blocks, breaking on wide spacing, font-size change or
/// indentation change.
pub fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<TextBlock> {
    let avg_spacing = average_line_spacing(&lines);

    let mut blocks: Vec<TextBlock> = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break_block(prev, &line, avg_spacing) {
                blocks.push(TextBlock {
                    lines: std::mem::take(&mut current),
                });
            }
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(TextBlock { lines: current });
    }

    blocks
}

fn average_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[1].y - w[0].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return DEFAULT_LEADING;
    }

    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn should_break_block(prev: &TextLine, curr: &TextLine, avg_spacing: f32) -> bool {
    let spacing = (curr.y - prev.y).abs();
    spacing > avg_spacing * 1.5
        || (prev.font_size - curr.font_size).abs() > 1.0
        || (prev.x - curr.x).abs() > 20.0
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    // Start of the current line; Td and T* are relative to it
    line_e: f32,
    line_f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_e: 0.0,
            line_f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self {
            a,
            b,
            c,
            d,
            e,
            f,
            line_e: e,
            line_f: f,
        };
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    /// Move the pen along the baseline after showing text.
    fn advance(&mut self, width: f32) {
        let scale = self.scale();
        if scale > 0.0 {
            self.e += width / scale * self.a;
            self.f += width / scale * self.b;
        }
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Check if a character belongs to a script written without word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        // Hiragana, Katakana
        || (0x3040..=0x30FF).contains(&code)
        // CJK Symbols and Punctuation
        || (0x3000..=0x303F).contains(&code)
}
