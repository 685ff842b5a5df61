//! Document model types.
//!
//! The extraction side (`Document`, `Page`, `Block`, `Table`) is the parsed
//! artifact written once per source file; `Chunk` is the unit handed to the
//! generation stage.

mod bbox;
mod chunk;
mod document;
mod page;
mod table;

pub use bbox::BBox;
pub use chunk::{Chunk, ChunkPosition, ChunkRecord, ChunkSource, ChunkType, TableChunk, TextChunk};
pub use document::{document_id_for, Document, Metadata};
pub use page::{Block, Page};
pub use table::{Table, TableRegion};
