//! Process configuration.
//!
//! A [`Settings`] value is built once at startup, usually from a config
//! directory holding `path.yaml`, `parameters.yaml` and `source-name.yaml`,
//! and passed by reference into every stage.

use crate::error::{Error, Result};
use crate::parser::ExtractOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const PATH_FILE: &str = "path.yaml";
pub const PARAMETERS_FILE: &str = "parameters.yaml";
pub const SOURCE_NAME_FILE: &str = "source-name.yaml";

fn default_max_chunk_words() -> usize {
    512
}

fn default_overlap_words() -> usize {
    64
}

fn default_max_archive_depth() -> usize {
    8
}

fn default_strip_extension() -> Vec<String> {
    vec!["arxiv".to_string()]
}

/// Data roots, as laid out in `path.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root of crawled source files
    pub raw: PathBuf,
    pub preprocessed: PreprocessedPaths,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessedPaths {
    /// Root of parsed document artifacts
    pub parsed: PathBuf,
    /// Root of chunk artifacts
    pub cleaned: PathBuf,
}

/// Word-window parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_chunk_words")]
    pub max_chunk_words: usize,
    #[serde(default = "default_overlap_words")]
    pub overlap_words: usize,
}

impl ChunkingConfig {
    /// Create a chunking configuration.
    pub fn new(max_chunk_words: usize, overlap_words: usize) -> Self {
        Self {
            max_chunk_words,
            overlap_words,
        }
    }

    /// Reject windows that cannot advance: zero size or overlap >= size.
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_words == 0 || self.overlap_words >= self.max_chunk_words {
            return Err(Error::InvalidChunking {
                max_words: self.max_chunk_words,
                overlap_words: self.overlap_words,
            });
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self::new(default_max_chunk_words(), default_overlap_words())
    }
}

/// Provenance options that live alongside the chunking parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceOptions {
    /// Sources whose sub-path keeps the file stem instead of dropping the file
    #[serde(default = "default_strip_extension")]
    pub strip_extension: Vec<String>,
    /// Label for paths matching no source; `None` falls back to the file name
    #[serde(default)]
    pub unknown_origin: Option<String>,
}

impl Default for ProvenanceOptions {
    fn default() -> Self {
        Self {
            strip_extension: default_strip_extension(),
            unknown_origin: None,
        }
    }
}

/// Contents of `parameters.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(flatten)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub extraction: ExtractOptions,
    #[serde(default)]
    pub provenance: ProvenanceOptions,
    #[serde(default = "default_max_archive_depth")]
    pub max_archive_depth: usize,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            extraction: ExtractOptions::default(),
            provenance: ProvenanceOptions::default(),
            max_archive_depth: default_max_archive_depth(),
        }
    }
}

/// Mapping from path-segment keys to display labels.
#[derive(Debug, Clone, Default)]
pub struct SourceNames {
    labels: BTreeMap<String, String>,
    strip_extension: Vec<String>,
    unknown_origin: Option<String>,
}

impl SourceNames {
    /// Build from a key → label map with default provenance options.
    pub fn new<I, K, V>(labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::with_options(labels, ProvenanceOptions::default())
    }

    /// Build from a key → label map and explicit provenance options.
    pub fn with_options<I, K, V>(labels: I, options: ProvenanceOptions) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            labels: labels
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            strip_extension: options.strip_extension,
            unknown_origin: options.unknown_origin,
        }
    }

    /// Label for a path segment, if it is a known source key.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Whether this source keeps the file stem in its origin.
    pub fn strips_extension(&self, key: &str) -> bool {
        self.strip_extension.iter().any(|k| k == key)
    }

    /// Label used when no source key matches; `None` means "use the file name".
    pub fn unknown_origin(&self) -> Option<&str> {
        self.unknown_origin.as_deref()
    }

    /// Set the no-match label.
    pub fn with_unknown_origin(mut self, label: impl Into<String>) -> Self {
        self.unknown_origin = Some(label.into());
        self
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Everything a run needs, constructed once and passed by reference.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Data roots; required only by the batch pipeline
    pub paths: Option<DataPaths>,
    pub parameters: Parameters,
    pub sources: SourceNames,
}

impl Settings {
    /// Load settings from a config directory.
    ///
    /// `parameters.yaml` and `source-name.yaml` are optional; `path.yaml` is
    /// optional here and checked by [`Settings::data_paths`].
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let paths = read_yaml_if_exists::<DataPaths>(&dir.join(PATH_FILE))?;
        let parameters =
            read_yaml_if_exists::<Parameters>(&dir.join(PARAMETERS_FILE))?.unwrap_or_default();
        let labels = read_yaml_if_exists::<BTreeMap<String, String>>(&dir.join(SOURCE_NAME_FILE))?
            .unwrap_or_default();

        let sources = SourceNames::with_options(labels, parameters.provenance.clone());

        log::debug!(
            "Loaded settings from {}: {} sources, max_chunk_words={}, overlap_words={}",
            dir.display(),
            sources.len(),
            parameters.chunking.max_chunk_words,
            parameters.chunking.overlap_words
        );

        Ok(Self {
            paths,
            parameters,
            sources,
        })
    }

    /// Load from a directory if given, otherwise use defaults.
    pub fn load_with_fallback(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(d) => Self::load_dir(d),
            None => Ok(Self::default()),
        }
    }

    /// Data roots, or a configuration error if `path.yaml` was absent.
    pub fn data_paths(&self) -> Result<&DataPaths> {
        self.paths
            .as_ref()
            .ok_or_else(|| Error::Config(format!("{} not found", PATH_FILE)))
    }

    pub fn chunking(&self) -> ChunkingConfig {
        self.parameters.chunking
    }

    pub fn extraction(&self) -> &ExtractOptions {
        &self.parameters.extraction
    }

    /// Override the chunk window.
    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.parameters.chunking = chunking;
        self
    }

    /// Replace the source-name map.
    pub fn with_sources(mut self, sources: SourceNames) -> Self {
        self.sources = sources;
        self
    }

    /// Set data roots.
    pub fn with_paths(mut self, raw: PathBuf, parsed: PathBuf, cleaned: PathBuf) -> Self {
        self.paths = Some(DataPaths {
            raw,
            preprocessed: PreprocessedPaths { parsed, cleaned },
        });
        self
    }
}

fn read_yaml_if_exists<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value = serde_yaml::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunking_defaults_are_valid() {
        let cfg = ChunkingConfig::default();
        assert_eq!(cfg.max_chunk_words, 512);
        assert_eq!(cfg.overlap_words, 64);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_chunking_rejects_non_advancing_window() {
        assert!(matches!(
            ChunkingConfig::new(64, 64).validate(),
            Err(Error::InvalidChunking { .. })
        ));
        assert!(ChunkingConfig::new(64, 100).validate().is_err());
        assert!(ChunkingConfig::new(0, 0).validate().is_err());
        assert!(ChunkingConfig::new(3, 0).validate().is_ok());
    }

    #[test]
    fn test_parameters_from_yaml() {
        let yaml = "max_chunk_words: 256\noverlap_words: 128\nextraction:\n  caption_band_height: 30\n";
        let params: Parameters = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(params.chunking, ChunkingConfig::new(256, 128));
        assert_eq!(params.extraction.caption_band_height, 30.0);
        assert_eq!(params.max_archive_depth, 8);
        assert_eq!(params.provenance.strip_extension, vec!["arxiv"]);
    }

    #[test]
    fn test_yaml_caption_keywords_match_any_case() {
        let yaml = "extraction:\n  caption_keywords: [\"Table\", \"Bảng\"]\n";
        let params: Parameters = serde_yaml::from_str(yaml).unwrap();
        let keywords = &params.extraction.caption_keywords;
        assert!(crate::parser::is_caption("Table 7.3-1: Timers", keywords));
        assert!(crate::parser::is_caption("BẢNG 2: Tham số", keywords));
        assert!(!crate::parser::is_caption("Timer values", keywords));
    }

    #[test]
    fn test_parameters_yaml_defaults() {
        let params: Parameters = serde_yaml::from_str("{}").unwrap();
        assert_eq!(params.chunking, ChunkingConfig::default());
    }

    #[test]
    fn test_source_names() {
        let sources = SourceNames::new([("3gpp_spec", "3GPP"), ("arxiv", "arXiv")]);
        assert_eq!(sources.label("3gpp_spec"), Some("3GPP"));
        assert_eq!(sources.label("itu"), None);
        assert!(sources.strips_extension("arxiv"));
        assert!(!sources.strips_extension("3gpp_spec"));
        assert_eq!(sources.unknown_origin(), None);

        let sources = sources.with_unknown_origin("Unknown");
        assert_eq!(sources.unknown_origin(), Some("Unknown"));
    }

    #[test]
    fn test_data_paths_required() {
        let settings = Settings::default();
        assert!(matches!(settings.data_paths(), Err(Error::Config(_))));
    }
}
