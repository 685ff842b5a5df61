//! Error types for the telechunk library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for telechunk operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting and chunking documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// The PDF structure is corrupted or malformed.
    #[error("Corrupted PDF structure: {0}")]
    Corrupted(String),

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Table detection failed for a document.
    #[error("Table detection error: {0}")]
    TableParse(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Chunk window parameters cannot produce a forward-moving window.
    #[error("Invalid chunking parameters: max_chunk_words={max_words}, overlap_words={overlap_words}")]
    InvalidChunking {
        /// Configured window size
        max_words: usize,
        /// Configured overlap
        overlap_words: usize,
    },

    /// Configuration file missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON or YAML (de)serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Archive could not be read or unpacked.
    #[error("Archive error in {path}: {message}")]
    Archive {
        /// Archive being processed
        path: PathBuf,
        /// Underlying failure
        message: String,
    },

    /// External conversion to PDF failed.
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::Archive {
                path: PathBuf::new(),
                message: other.to_string(),
            },
        }
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io(err.error)
    }
}
