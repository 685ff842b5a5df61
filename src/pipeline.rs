//! Batch pipeline over the data roots.
//!
//! The parse stage mirrors every source under the raw root into a parsed
//! document artifact; the clean stage mirrors every parsed artifact into a
//! chunk artifact. Documents run in parallel, each on its own, and an
//! existing artifact is never recomputed.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::clean::{build_chunks, origin, Normalizer};
use crate::config::Settings;
use crate::convert::ConverterRegistry;
use crate::detect::{classify_path, SourceKind};
use crate::error::{Error, Result};
use crate::model::{document_id_for, Chunk, Document};
use crate::parser::PdfExtractor;

/// Shared flag that stops documents from starting once set.
///
/// Documents already in flight finish; their writes are atomic, so a
/// cancelled run leaves no partial artifacts.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What happened to one document in a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Artifact written; `chunks` is zero for the parse stage
    Processed { chunks: usize },
    /// Artifact already existed
    Skipped,
    /// Document failed; the error was logged
    Failed(String),
    /// Not started because the run was cancelled
    Cancelled,
}

/// Per-stage counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Chunks written (clean stage only)
    pub chunks: usize,
}

impl BatchReport {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Processed { chunks } => {
                self.processed += 1;
                self.chunks += chunks;
            }
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed(_) => self.failed += 1,
            Outcome::Cancelled => self.cancelled += 1,
        }
    }

    /// Total documents seen.
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed + self.cancelled
    }
}

impl FromIterator<Outcome> for BatchReport {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        let mut report = BatchReport::default();
        for outcome in iter {
            report.record(&outcome);
        }
        report
    }
}

/// Reports of both stages of [`Pipeline::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub parse: BatchReport,
    pub clean: BatchReport,
}

type ProgressFn<'a> = dyn Fn(&Path, &Outcome) + Send + Sync + 'a;

/// Batch driver over the configured data roots.
pub struct Pipeline<'a> {
    settings: &'a Settings,
    converters: Option<&'a ConverterRegistry>,
    cancel: CancelFlag,
    jobs: Option<usize>,
    progress: Option<Box<ProgressFn<'a>>>,
    normalizer: Normalizer,
}

impl<'a> Pipeline<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            converters: None,
            cancel: CancelFlag::new(),
            jobs: None,
            progress: None,
            normalizer: Normalizer::new(),
        }
    }

    /// Convert office documents with these converters before extraction.
    pub fn with_converters(mut self, converters: &'a ConverterRegistry) -> Self {
        self.converters = Some(converters);
        self
    }

    /// Share a cancellation flag with the caller.
    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = flag;
        self
    }

    /// Limit the number of worker threads.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs.max(1));
        self
    }

    /// Called after every document with its outcome.
    pub fn with_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(&Path, &Outcome) + Send + Sync + 'a,
    {
        self.progress = Some(Box::new(f));
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Parse then clean.
    pub fn run(&self) -> Result<RunReport> {
        let parse = self.parse_all()?;
        let clean = self.clean_all()?;
        Ok(RunReport { parse, clean })
    }

    /// Sources the parse stage would visit, sorted.
    pub fn parse_sources(&self) -> Result<Vec<PathBuf>> {
        let raw = &self.settings.data_paths()?.raw;
        Ok(walk_files(raw, |path| match classify_path(path) {
            SourceKind::Pdf => true,
            SourceKind::Office(ext) => self
                .converters
                .map_or(false, |registry| registry.find(&ext).is_some()),
            _ => false,
        }))
    }

    /// Extract every source under the raw root into a parsed artifact.
    pub fn parse_all(&self) -> Result<BatchReport> {
        let paths = self.settings.data_paths()?;
        let sources = self.parse_sources()?;
        log::info!(
            "Parsing {} sources from {}",
            sources.len(),
            paths.raw.display()
        );

        let (sources, shadowed) =
            claim_targets(sources, &paths.raw, &paths.preprocessed.parsed)?;
        for source in &shadowed {
            if let Some(progress) = &self.progress {
                progress(source, &Outcome::Skipped);
            }
        }

        let mut report = self.for_each(&sources, |source| {
            let target = mirror_path(source, &paths.raw, &paths.preprocessed.parsed, "json")?;
            if target.exists() {
                log::debug!("Skipping (already parsed): {}", source.display());
                return Ok(Outcome::Skipped);
            }
            let document = self.extract_source(source)?;
            write_json_atomic(&target, &document)?;
            log::info!(
                "Parsed {} ({} pages, {} tables) -> {}",
                source.display(),
                document.total_pages,
                document.tables.len(),
                target.display()
            );
            Ok(Outcome::Processed { chunks: 0 })
        })?;
        report.skipped += shadowed.len();

        log::info!("Parse stage: {:?}", report);
        Ok(report)
    }

    /// Parsed artifacts the clean stage would visit, sorted.
    pub fn clean_sources(&self) -> Result<Vec<PathBuf>> {
        let parsed = &self.settings.data_paths()?.preprocessed.parsed;
        Ok(walk_files(parsed, |path| has_extension(path, "json")))
    }

    /// Chunk every parsed artifact into a chunk artifact.
    pub fn clean_all(&self) -> Result<BatchReport> {
        let paths = self.settings.data_paths()?;
        let parsed_root = &paths.preprocessed.parsed;
        let chunking = self.settings.chunking();
        chunking.validate()?;

        let artifacts = self.clean_sources()?;
        log::info!(
            "Cleaning {} parsed documents from {}",
            artifacts.len(),
            parsed_root.display()
        );

        let report = self.for_each(&artifacts, |artifact| {
            let target = mirror_path(artifact, parsed_root, &paths.preprocessed.cleaned, "json")?;
            if target.exists() {
                log::debug!("Skipping (already cleaned): {}", artifact.display());
                return Ok(Outcome::Skipped);
            }

            let mut document: Document =
                serde_json::from_reader(BufReader::new(File::open(artifact)?))?;
            document.document_id = file_name(artifact);

            let relative = artifact.strip_prefix(parsed_root).unwrap_or(artifact);
            let origin = origin(relative, &self.settings.sources);
            let chunks = build_chunks(&document, &origin, chunking, &self.normalizer)?;

            write_json_atomic(&target, &chunks)?;
            log::info!(
                "Saved {} chunks for {} -> {}",
                chunks.len(),
                artifact.display(),
                target.display()
            );
            Ok(Outcome::Processed {
                chunks: chunks.len(),
            })
        })?;

        log::info!("Clean stage: {:?}", report);
        Ok(report)
    }

    /// Extract one source, converting it to PDF first if needed.
    fn extract_source(&self, source: &Path) -> Result<Document> {
        let options = self.settings.extraction().clone();

        match (classify_path(source), self.converters) {
            (SourceKind::Office(ext), Some(registry)) => {
                let converter = registry
                    .find(&ext)
                    .ok_or_else(|| Error::Conversion(format!("no converter for .{}", ext)))?;
                let scratch = tempfile::tempdir()?;
                let pdf = converter.convert_to_pdf(source, scratch.path())?;
                let mut document = PdfExtractor::open(&pdf, options)?.extract()?;
                document.document_id = document_id_for(source);
                document.file_name = file_name(source);
                Ok(document)
            }
            _ => PdfExtractor::open(source, options)?.extract(),
        }
    }

    /// Run `work` over `items` in parallel, isolating failures per item.
    fn for_each<F>(&self, items: &[PathBuf], work: F) -> Result<BatchReport>
    where
        F: Fn(&Path) -> Result<Outcome> + Send + Sync,
    {
        let run_one = |item: &PathBuf| -> Outcome {
            let outcome = if self.cancel.is_cancelled() {
                Outcome::Cancelled
            } else {
                match work(item) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        log::warn!("Failed {}: {}", item.display(), e);
                        Outcome::Failed(e.to_string())
                    }
                }
            };
            if let Some(progress) = &self.progress {
                progress(item, &outcome);
            }
            outcome
        };

        match self.jobs {
            Some(jobs) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs)
                    .build()
                    .map_err(|e| Error::Other(format!("worker pool: {}", e)))?;
                let outcomes: Vec<Outcome> =
                    pool.install(|| items.par_iter().map(run_one).collect());
                Ok(outcomes.into_iter().collect())
            }
            None => {
                let outcomes: Vec<Outcome> = items.par_iter().map(run_one).collect();
                Ok(outcomes.into_iter().collect())
            }
        }
    }
}

/// Extract and chunk one PDF in memory.
pub fn process_pdf<P: AsRef<Path>>(path: P, settings: &Settings) -> Result<Vec<Chunk>> {
    let path = path.as_ref();
    let chunking = settings.chunking();
    chunking.validate()?;

    let document = PdfExtractor::open(path, settings.extraction().clone())?.extract()?;
    let origin = origin(path, &settings.sources);
    build_chunks(&document, &origin, chunking, &Normalizer::new())
}

/// Write pretty JSON (4-space indent) through a temp file in the target
/// directory, then move it into place.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut tmp, formatter);
        value.serialize(&mut ser)?;
    }
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// Map `path` under `from` to the same relative path under `to`, with a new
/// extension.
pub fn mirror_path(path: &Path, from: &Path, to: &Path, extension: &str) -> Result<PathBuf> {
    let relative = path.strip_prefix(from).map_err(|_| {
        Error::Other(format!(
            "{} is not under {}",
            path.display(),
            from.display()
        ))
    })?;
    Ok(to.join(relative).with_extension(extension))
}

/// Split sources into those that own their parsed artifact path and those
/// shadowed by another source mapping to the same path.
///
/// A PDF wins over an office file with the same stem; otherwise the first in
/// sorted order wins.
fn claim_targets(
    sources: Vec<PathBuf>,
    raw: &Path,
    parsed: &Path,
) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut claimed: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
    let mut shadowed = Vec::new();

    for source in sources {
        let target = mirror_path(&source, raw, parsed, "json")?;
        match claimed.entry(target) {
            Entry::Vacant(slot) => {
                slot.insert(source);
            }
            Entry::Occupied(mut slot) => {
                let replaces = classify_path(&source) == SourceKind::Pdf
                    && classify_path(slot.get()) != SourceKind::Pdf;
                let (kept, lost) = if replaces {
                    let previous = slot.insert(source);
                    (slot.get().clone(), previous)
                } else {
                    (slot.get().clone(), source)
                };
                log::warn!(
                    "Skipping {}: {} maps to the same artifact {}",
                    lost.display(),
                    kept.display(),
                    slot.key().display()
                );
                shadowed.push(lost);
            }
        }
    }

    let mut sources: Vec<PathBuf> = claimed.into_values().collect();
    sources.sort();
    Ok((sources, shadowed))
}

/// Regular files under `root` accepted by `keep`, sorted.
fn walk_files<F>(root: &Path, keep: F) -> Vec<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    if !root.exists() {
        log::warn!("Directory not found: {}", root.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && keep(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Page, Table};

    #[test]
    fn test_claim_targets_prefers_pdf() {
        let raw = Path::new("/r");
        let sources = vec![
            PathBuf::from("/r/itu/G.989.docx"),
            PathBuf::from("/r/itu/G.989.pdf"),
            PathBuf::from("/r/itu/G.984.docx"),
        ];
        let (kept, shadowed) = claim_targets(sources, raw, Path::new("/p")).unwrap();
        assert_eq!(
            kept,
            vec![PathBuf::from("/r/itu/G.984.docx"), PathBuf::from("/r/itu/G.989.pdf")]
        );
        assert_eq!(shadowed, vec![PathBuf::from("/r/itu/G.989.docx")]);
    }

    #[test]
    fn test_mirror_path() {
        let target = mirror_path(
            Path::new("/data/raw/3gpp_spec/Rel-17/ts.pdf"),
            Path::new("/data/raw"),
            Path::new("/data/parsed"),
            "json",
        )
        .unwrap();
        assert_eq!(target, PathBuf::from("/data/parsed/3gpp_spec/Rel-17/ts.json"));

        assert!(mirror_path(
            Path::new("/elsewhere/ts.pdf"),
            Path::new("/data/raw"),
            Path::new("/data/parsed"),
            "json"
        )
        .is_err());
    }

    #[test]
    fn test_batch_report_from_outcomes() {
        let report: BatchReport = vec![
            Outcome::Processed { chunks: 3 },
            Outcome::Processed { chunks: 2 },
            Outcome::Skipped,
            Outcome::Failed("bad".into()),
            Outcome::Cancelled,
        ]
        .into_iter()
        .collect();
        assert_eq!(report.processed, 2);
        assert_eq!(report.chunks, 5);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.cancelled, 1);
        assert_eq!(report.total(), 5);
    }

    #[test]
    fn test_write_json_atomic_indents_four_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        write_json_atomic(&path, &serde_json::json!({"k": [1]})).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n    \"k\": [\n        1\n    ]\n}\n");
        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    fn parsed_fixture(root: &Path) -> PathBuf {
        let mut doc = Document::for_source("ts_38331.pdf");
        let mut page = Page::a4(1);
        page.push_block("Radio resource control", BBox::new(50.0, 50.0, 300.0, 70.0));
        doc.add_page(page);
        doc.add_table(Table::from_rows(
            1,
            0,
            BBox::new(50.0, 200.0, 300.0, 300.0),
            vec![vec!["Timer", "Value"], vec!["T300", "1000"]],
        ));
        let path = root.join("3gpp_spec/Rel-17/ts_38331.json");
        write_json_atomic(&path, &doc).unwrap();
        path
    }

    fn settings(root: &Path) -> Settings {
        Settings::default()
            .with_paths(root.join("raw"), root.join("parsed"), root.join("cleaned"))
            .with_sources(crate::config::SourceNames::new([("3gpp_spec", "3GPP")]))
    }

    #[test]
    fn test_clean_all_writes_chunks_and_skips_existing() {
        let dir = tempfile::tempdir().unwrap();
        parsed_fixture(&dir.path().join("parsed"));
        let settings = settings(dir.path());
        let pipeline = Pipeline::new(&settings).with_jobs(2);

        let report = pipeline.clean_all().unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.chunks, 2);

        let out = dir.path().join("cleaned/3gpp_spec/Rel-17/ts_38331.json");
        let chunks: Vec<Chunk> = serde_json::from_reader(File::open(&out).unwrap()).unwrap();
        assert_eq!(chunks[0].origin(), "3GPP/Rel-17");
        assert_eq!(chunks[0].document_id(), "ts_38331.json");

        let again = pipeline.clean_all().unwrap();
        assert_eq!(again.skipped, 1);
        assert_eq!(again.processed, 0);
    }

    #[test]
    fn test_cancelled_pipeline_starts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        parsed_fixture(&dir.path().join("parsed"));
        let settings = settings(dir.path());
        let flag = CancelFlag::new();
        flag.cancel();

        let report = Pipeline::new(&settings)
            .with_cancel_flag(flag)
            .clean_all()
            .unwrap();
        assert_eq!(report.cancelled, 1);
        assert!(!dir.path().join("cleaned").exists());
    }

    #[test]
    fn test_bad_artifact_fails_alone() {
        let dir = tempfile::tempdir().unwrap();
        let parsed = dir.path().join("parsed");
        parsed_fixture(&parsed);
        fs::write(parsed.join("broken.json"), "{ not json").unwrap();
        let settings = settings(dir.path());

        let report = Pipeline::new(&settings).clean_all().unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.processed, 1);
    }

    #[test]
    fn test_parse_all_without_paths_is_config_error() {
        let settings = Settings::default();
        assert!(matches!(
            Pipeline::new(&settings).parse_all(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_parse_sources_filters_by_kind() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw/itu");
        fs::create_dir_all(&raw).unwrap();
        fs::write(raw.join("a.PDF"), b"%PDF-1.4").unwrap();
        fs::write(raw.join("b.docx"), b"").unwrap();
        fs::write(raw.join("c.txt"), b"").unwrap();
        let settings = settings(dir.path());

        let sources = Pipeline::new(&settings).parse_sources().unwrap();
        assert_eq!(sources, vec![raw.join("a.PDF")]);
    }
}
