//! Turning extracted documents into chunks.
//!
//! The stages are independent pure functions: table-region resolution,
//! normalization, windowing, table rendering and provenance.
//! [`build_chunks`] strings them together for one document.

mod chunker;
mod formatter;
mod normalize;
mod provenance;
mod resolver;

pub use chunker::{chunk, word_count, WordWindows};
pub use formatter::{format_table, TABLE_END, TABLE_START};
pub use normalize::Normalizer;
pub use provenance::origin;
pub use resolver::{is_inside_table, TableRegions};

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::model::{Chunk, Document, TableChunk, TextChunk};

/// Build every chunk of a document: text windows first, then tables.
///
/// Blocks covered by a table are left out of the text. Tables that render
/// empty (fewer than two rows) produce no chunk.
pub fn build_chunks(
    document: &Document,
    origin: &str,
    chunking: ChunkingConfig,
    normalizer: &Normalizer,
) -> Result<Vec<Chunk>> {
    chunking.validate()?;

    let regions = TableRegions::from_tables(&document.tables);
    let full_text = document
        .pages
        .iter()
        .flat_map(|page| regions.retained_blocks(page))
        .map(|block| normalizer.normalize(&block.text))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut chunks: Vec<Chunk> = WordWindows::new(
        &full_text,
        chunking.max_chunk_words,
        chunking.overlap_words,
    )
    .enumerate()
    .map(|(i, context)| {
        Chunk::Text(TextChunk {
            length_words: word_count(&context),
            context,
            document_id: document.document_id.clone(),
            origin: origin.to_string(),
            chunk_order: i as u32 + 1,
        })
    })
    .collect();

    for table in &document.tables {
        let context = format_table(
            normalizer,
            &table.data,
            table.caption.as_deref(),
            &table.surrounding_context,
        );
        if context.is_empty() {
            log::debug!(
                "{}: table {} on page {} has fewer than two rows",
                document.document_id,
                table.table_index,
                table.page_no
            );
            continue;
        }
        chunks.push(Chunk::Table(TableChunk {
            length_words: word_count(&context),
            context,
            document_id: document.document_id.clone(),
            origin: origin.to_string(),
            page_no: table.page_no,
            table_index: table.table_index,
        }));
    }

    Ok(chunks)
}
