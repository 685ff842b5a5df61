//! Caption and surrounding-context lookup around a table.
//!
//! Both searches read the text lying in horizontal bands directly above and
//! below a table's bounding box.

use crate::model::BBox;

use super::layout::{join_spans, TextLine};
use super::options::ExtractOptions;

/// Positioned lines of one page, queried by rectangular bands.
pub struct BandText<'a> {
    lines: &'a [TextLine],
    page_width: f32,
    page_height: f32,
}

impl<'a> BandText<'a> {
    pub fn new(lines: &'a [TextLine], page_width: f32, page_height: f32) -> Self {
        Self {
            lines,
            page_width,
            page_height,
        }
    }

    /// Text whose span centers fall inside `band`, flattened to one line:
    /// non-empty trimmed lines joined by a single space.
    pub fn text_in(&self, band: &BBox) -> String {
        self.lines
            .iter()
            .map(|line| {
                join_spans(line.spans.iter().filter(|span| {
                    let (cx, cy) = span.bbox().center();
                    band.contains_point(cx, cy)
                }))
            })
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Caption for a table: the padded band above it, then the band below,
    /// whichever first contains a caption keyword.
    pub fn caption_for(&self, table: &BBox, options: &ExtractOptions) -> Option<String> {
        let x0 = (table.x0 - options.caption_padding).max(0.0);
        let x1 = (table.x1 + options.caption_padding).min(self.page_width);
        let above = BBox::new(
            x0,
            (table.y0 - options.caption_band_height).max(0.0),
            x1,
            table.y0,
        );
        let below = BBox::new(
            x0,
            table.y1,
            x1,
            (table.y1 + options.caption_band_height).min(self.page_height),
        );

        [above, below]
            .iter()
            .map(|band| self.text_in(band))
            .find(|text| is_caption(text, &options.caption_keywords))
    }

    /// Unfiltered text in full-width bands above and below the table.
    pub fn context_for(&self, table: &BBox, options: &ExtractOptions) -> String {
        let above = BBox::new(
            0.0,
            (table.y0 - options.context_band_height).max(0.0),
            self.page_width,
            table.y0,
        );
        let below = BBox::new(
            0.0,
            table.y1,
            self.page_width,
            (table.y1 + options.context_band_height).min(self.page_height),
        );

        format!("{}\n{}", self.text_in(&above), self.text_in(&below))
            .trim()
            .to_string()
    }
}

/// Whether flattened band text mentions one of the caption keywords.
pub fn is_caption(text: &str, keywords: &[String]) -> bool {
    if text.is_empty() {
        return false;
    }
    let lowered = text.to_lowercase();
    keywords
        .iter()
        .any(|k| lowered.contains(k.to_lowercase().as_str()))
}
