//! telechunk CLI - chunk telecom standards for retrieval

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use telechunk::archive::{extract_nested, extraction_dir};
use telechunk::pipeline::{write_json_atomic, Outcome};
use telechunk::{
    build_chunks, origin, BatchReport, ChunkingConfig, ConverterRegistry, ExtractOptions,
    Normalizer, PdfExtractor, Pipeline, Settings,
};

#[derive(Parser)]
#[command(name = "telechunk")]
#[command(version)]
#[command(about = "Extract and chunk telecom standards for retrieval", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct BatchArgs {
    /// Directory holding path.yaml, parameters.yaml and source-name.yaml
    #[arg(short, long, value_name = "DIR", env = "TELECHUNK_CONFIG", default_value = "config")]
    config: PathBuf,

    /// Worker threads (default: one per core)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Convert office documents with LibreOffice before parsing
    #[arg(long)]
    convert: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse raw sources, then chunk the parsed documents
    Run {
        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Parse every raw source into a document artifact
    Parse {
        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Chunk every parsed document
    Clean {
        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Extract and chunk a single PDF
    Chunk {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Configuration directory (for source names)
        #[arg(short, long, value_name = "DIR", env = "TELECHUNK_CONFIG")]
        config: Option<PathBuf>,

        /// Maximum words per text chunk
        #[arg(long)]
        max_words: Option<usize>,

        /// Words shared by consecutive text chunks
        #[arg(long)]
        overlap: Option<usize>,

        /// Keep only tables that have a caption
        #[arg(long)]
        require_caption: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Extract a single PDF to document JSON
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Fail on the first unreadable page
        #[arg(long)]
        strict: bool,
    },

    /// Print the origin label for a path
    Origin {
        /// Path under the parsed or cleaned root
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Configuration directory
        #[arg(short, long, value_name = "DIR", env = "TELECHUNK_CONFIG", default_value = "config")]
        config: PathBuf,
    },

    /// Unpack a zip archive and the archives nested inside it
    Unzip {
        /// Input archive
        #[arg(value_name = "ARCHIVE")]
        input: PathBuf,

        /// Output directory (next to the archive if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Maximum nesting depth (defaults to max_archive_depth from parameters.yaml)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Configuration directory
        #[arg(short, long, value_name = "DIR", env = "TELECHUNK_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { batch } => {
            cmd_batch(&batch, Stage::Parse).and_then(|_| cmd_batch(&batch, Stage::Clean))
        }
        Commands::Parse { batch } => cmd_batch(&batch, Stage::Parse),
        Commands::Clean { batch } => cmd_batch(&batch, Stage::Clean),
        Commands::Chunk {
            input,
            output,
            config,
            max_words,
            overlap,
            require_caption,
            compact,
        } => cmd_chunk(
            &input,
            output.as_deref(),
            config.as_deref(),
            max_words,
            overlap,
            require_caption,
            compact,
        ),
        Commands::Extract {
            input,
            output,
            strict,
        } => cmd_extract(&input, output.as_deref(), strict),
        Commands::Origin { path, config } => cmd_origin(&path, &config),
        Commands::Unzip {
            input,
            output,
            max_depth,
            config,
        } => cmd_unzip(&input, output.as_deref(), max_depth, config.as_deref()),
        Commands::Info { input } => cmd_info(&input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

#[derive(Clone, Copy)]
enum Stage {
    Parse,
    Clean,
}

fn cmd_batch(batch: &BatchArgs, stage: Stage) -> CliResult {
    let settings = Settings::load_dir(&batch.config)?;
    log::debug!("Loaded settings from {}", batch.config.display());
    let registry = ConverterRegistry::with_defaults();

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let progress = pb.clone();
    let mut pipeline = Pipeline::new(&settings).with_progress(move |path: &Path, outcome: &Outcome| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if let Outcome::Failed(e) = outcome {
            progress.println(format!("{} {}: {}", "Failed".red(), name, e));
        }
        progress.set_message(name);
        progress.inc(1);
    });
    if let Some(jobs) = batch.jobs {
        pipeline = pipeline.with_jobs(jobs);
    }
    if batch.convert {
        pipeline = pipeline.with_converters(&registry);
    }

    let (label, report) = match stage {
        Stage::Parse => {
            pb.set_length(pipeline.parse_sources()?.len() as u64);
            ("Parse", pipeline.parse_all()?)
        }
        Stage::Clean => {
            pb.set_length(pipeline.clean_sources()?.len() as u64);
            ("Clean", pipeline.clean_all()?)
        }
    };
    pb.finish_and_clear();

    print_report(label, &report);
    Ok(())
}

fn print_report(stage: &str, report: &BatchReport) {
    println!("{} {}", stage.cyan().bold(), "stage".cyan());
    println!("  {} processed: {}", "├─".dimmed(), report.processed);
    println!("  {} skipped:   {}", "├─".dimmed(), report.skipped);
    if report.cancelled > 0 {
        println!("  {} cancelled: {}", "├─".dimmed(), report.cancelled);
    }
    if report.chunks > 0 {
        println!("  {} chunks:    {}", "├─".dimmed(), report.chunks);
    }
    let failed = format!("{}", report.failed);
    println!(
        "  {} failed:    {}",
        "└─".dimmed(),
        if report.failed > 0 { failed.red() } else { failed.normal() }
    );
}

#[allow(clippy::too_many_arguments)]
fn cmd_chunk(
    input: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    max_words: Option<usize>,
    overlap: Option<usize>,
    require_caption: bool,
    compact: bool,
) -> CliResult {
    let settings = Settings::load_with_fallback(config)?;
    let defaults = settings.chunking();
    let chunking = ChunkingConfig::new(
        max_words.unwrap_or(defaults.max_chunk_words),
        overlap.unwrap_or(defaults.overlap_words),
    );
    chunking.validate()?;

    let options = settings
        .extraction()
        .clone()
        .with_require_caption(require_caption || settings.extraction().require_caption);
    let document = PdfExtractor::open(input, options)?.extract()?;
    let origin = origin(input, &settings.sources);
    let chunks = build_chunks(&document, &origin, chunking, &Normalizer::new())?;

    if let Some(path) = output {
        write_json_atomic(path, &chunks)?;
        println!(
            "{} {} chunks to {}",
            "Saved".green(),
            chunks.len(),
            path.display()
        );
    } else if compact {
        println!("{}", serde_json::to_string(&chunks)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&chunks)?);
    }

    Ok(())
}

fn cmd_extract(input: &Path, output: Option<&Path>, strict: bool) -> CliResult {
    let mut options = ExtractOptions::new();
    if strict {
        options = options.with_error_mode(telechunk::ErrorMode::Strict);
    }
    let document = PdfExtractor::open(input, options)?.extract()?;

    if let Some(path) = output {
        write_json_atomic(path, &document)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", serde_json::to_string_pretty(&document)?);
    }

    Ok(())
}

fn cmd_origin(path: &Path, config: &Path) -> CliResult {
    let settings = Settings::load_dir(config)?;
    println!("{}", origin(path, &settings.sources));
    Ok(())
}

fn cmd_unzip(
    input: &Path,
    output: Option<&Path>,
    max_depth: Option<usize>,
    config: Option<&Path>,
) -> CliResult {
    let max_depth = match max_depth {
        Some(depth) => depth,
        None => Settings::load_with_fallback(config)?.parameters.max_archive_depth,
    };
    let dest = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| extraction_dir(input));

    let pb = ProgressBar::new_spinner();
    pb.set_message(format!("Unpacking {}...", input.display()));
    let files = extract_nested(input, &dest, max_depth)?;
    pb.finish_and_clear();

    println!(
        "{} {} files into {}",
        "Unpacked".green().bold(),
        files.len(),
        dest.display()
    );
    Ok(())
}

fn cmd_info(input: &Path) -> CliResult {
    let document = PdfExtractor::open(input, ExtractOptions::new().lenient())?.extract()?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), document.metadata.pdf_version);
    println!("{}: {}", "Pages".bold(), document.total_pages);

    if let Some(ref title) = document.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = document.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref producer) = document.metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = document.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let blocks: usize = document.pages.iter().map(|p| p.blocks.len()).sum();
    let words: usize = document
        .pages
        .iter()
        .flat_map(|p| p.blocks.iter())
        .map(|b| b.text.split_whitespace().count())
        .sum();
    let captioned = document.tables.iter().filter(|t| t.caption.is_some()).count();

    println!("{}: {}", "Blocks".bold(), blocks);
    println!("{}: {}", "Words".bold(), words);
    println!(
        "{}: {} ({} captioned)",
        "Tables".bold(),
        document.tables.len(),
        captioned
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "telechunk".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Telecom standards chunking tool");
}
