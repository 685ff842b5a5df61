//! Chunk records handed to the generation stage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of chunk, as written in the `chunk_type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkType {
    /// A window of flowing text
    TextBlock,
    /// A rendered table
    TechnicalTable,
}

impl ChunkType {
    /// Wire name of the chunk type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkType::TextBlock => "TEXT_BLOCK",
            ChunkType::TechnicalTable => "TECHNICAL_TABLE",
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A window of words from a document's cleaned, non-table text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub context: String,
    pub document_id: String,
    pub origin: String,
    /// 1-based position among the document's text chunks
    pub chunk_order: u32,
    pub length_words: usize,
}

/// One rendered table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableChunk {
    pub context: String,
    pub document_id: String,
    pub origin: String,
    pub page_no: u32,
    pub table_index: u32,
    pub length_words: usize,
}

/// A chunk of either kind.
///
/// Serializes as a [`ChunkRecord`]: `{"context": .., "source": {..}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ChunkRecord", from = "ChunkRecord")]
pub enum Chunk {
    Text(TextChunk),
    Table(TableChunk),
}

impl Chunk {
    /// The chunk's text.
    pub fn context(&self) -> &str {
        match self {
            Chunk::Text(c) => &c.context,
            Chunk::Table(c) => &c.context,
        }
    }

    pub fn document_id(&self) -> &str {
        match self {
            Chunk::Text(c) => &c.document_id,
            Chunk::Table(c) => &c.document_id,
        }
    }

    pub fn origin(&self) -> &str {
        match self {
            Chunk::Text(c) => &c.origin,
            Chunk::Table(c) => &c.origin,
        }
    }

    pub fn length_words(&self) -> usize {
        match self {
            Chunk::Text(c) => c.length_words,
            Chunk::Table(c) => c.length_words,
        }
    }

    pub fn chunk_type(&self) -> ChunkType {
        match self {
            Chunk::Text(_) => ChunkType::TextBlock,
            Chunk::Table(_) => ChunkType::TechnicalTable,
        }
    }

    /// Serialize to a JSON value in the record layout.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(ChunkRecord::from(self.clone())).unwrap_or(serde_json::Value::Null)
    }
}

/// Serialized form of a chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub context: String,
    pub source: ChunkSource,
}

/// Provenance block of a serialized chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkSource {
    pub document_id: String,
    pub origin: String,
    #[serde(flatten)]
    pub position: ChunkPosition,
    pub length_words: usize,
}

/// Type-specific position fields, tagged by `chunk_type`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chunk_type")]
pub enum ChunkPosition {
    #[serde(rename = "TEXT_BLOCK")]
    TextBlock { chunk_order: u32 },
    #[serde(rename = "TECHNICAL_TABLE")]
    TechnicalTable { page_no: u32, table_index: u32 },
}

impl From<Chunk> for ChunkRecord {
    fn from(chunk: Chunk) -> Self {
        match chunk {
            Chunk::Text(c) => ChunkRecord {
                context: c.context,
                source: ChunkSource {
                    document_id: c.document_id,
                    origin: c.origin,
                    position: ChunkPosition::TextBlock {
                        chunk_order: c.chunk_order,
                    },
                    length_words: c.length_words,
                },
            },
            Chunk::Table(c) => ChunkRecord {
                context: c.context,
                source: ChunkSource {
                    document_id: c.document_id,
                    origin: c.origin,
                    position: ChunkPosition::TechnicalTable {
                        page_no: c.page_no,
                        table_index: c.table_index,
                    },
                    length_words: c.length_words,
                },
            },
        }
    }
}

impl From<ChunkRecord> for Chunk {
    fn from(record: ChunkRecord) -> Self {
        let ChunkRecord { context, source } = record;
        match source.position {
            ChunkPosition::TextBlock { chunk_order } => Chunk::Text(TextChunk {
                context,
                document_id: source.document_id,
                origin: source.origin,
                chunk_order,
                length_words: source.length_words,
            }),
            ChunkPosition::TechnicalTable {
                page_no,
                table_index,
            } => Chunk::Table(TableChunk {
                context,
                document_id: source.document_id,
                origin: source.origin,
                page_no,
                table_index,
                length_words: source.length_words,
            }),
        }
    }
}
