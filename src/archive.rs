//! Nested zip extraction for raw-data directories.
//!
//! Standards bodies ship specifications as zips that sometimes contain
//! further zips. Each archive `name.zip` is unpacked into a sibling
//! directory `name/`, and any zips found inside are unpacked the same way
//! up to a depth limit.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::detect::{classify_path, SourceKind};
use crate::error::{Error, Result};

/// Default limit on archive nesting.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Directory an archive unpacks into: its path without the extension.
pub fn extraction_dir(archive: &Path) -> PathBuf {
    archive.with_extension("")
}

/// Unpack one archive into `dest`, returning the files written.
///
/// Entries whose names would escape `dest` are skipped.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| Error::Archive {
        path: archive.to_path_buf(),
        message: e.to_string(),
    })?;

    fs::create_dir_all(dest)?;
    let mut written = Vec::new();

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| Error::Archive {
            path: archive.to_path_buf(),
            message: e.to_string(),
        })?;

        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            log::warn!(
                "{}: skipping entry outside the archive root: {}",
                archive.display(),
                entry.name()
            );
            continue;
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        written.push(target);
    }

    log::debug!(
        "Extracted {} files from {} into {}",
        written.len(),
        archive.display(),
        dest.display()
    );
    Ok(written)
}

/// Unpack an archive into `dest` and every archive nested inside it next to
/// itself.
///
/// Archives deeper than `max_depth` levels are left packed and logged, as are
/// nested archives that fail to open. Only a failure of `archive` itself is
/// an error. Returns every file left on disk (including packed ones), sorted.
pub fn extract_nested(archive: &Path, dest: &Path, max_depth: usize) -> Result<Vec<PathBuf>> {
    let mut pending: Vec<(PathBuf, PathBuf, usize)> =
        vec![(archive.to_path_buf(), dest.to_path_buf(), 1)];
    let mut files = Vec::new();

    while let Some((current, dest, depth)) = pending.pop() {
        if depth > max_depth {
            log::warn!(
                "{}: nesting deeper than {} levels, left packed",
                current.display(),
                max_depth
            );
            files.push(current);
            continue;
        }

        let extracted = match extract_archive(&current, &dest) {
            Ok(extracted) => extracted,
            Err(e) if depth > 1 => {
                log::warn!("{}: {}, left packed", current.display(), e);
                files.push(current);
                continue;
            }
            Err(e) => return Err(e),
        };

        for path in extracted {
            if classify_path(&path) == SourceKind::Archive {
                let nested_dest = extraction_dir(&path);
                pending.push((path, nested_dest, depth + 1));
            } else {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Summary of unpacking a directory tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnpackReport {
    pub archives: usize,
    pub files: usize,
    pub failed: usize,
}

/// Unpack every archive under `root` whose extraction directory does not
/// exist yet. A corrupt archive is logged and counted, not fatal.
pub fn extract_all(root: &Path, max_depth: usize) -> UnpackReport {
    let mut archives: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && classify_path(e.path()) == SourceKind::Archive)
        .map(|e| e.into_path())
        .collect();
    archives.sort();

    let mut report = UnpackReport::default();
    for archive in archives {
        let dest = extraction_dir(&archive);
        if dest.exists() {
            log::debug!("Skipping (already unpacked): {}", archive.display());
            continue;
        }
        match extract_nested(&archive, &dest, max_depth) {
            Ok(files) => {
                report.archives += 1;
                report.files += files.len();
                log::info!("Unpacked {} ({} files)", archive.display(), files.len());
            }
            Err(e) => {
                report.failed += 1;
                log::warn!("Failed to unpack {}: {}", archive.display(), e);
            }
        }
    }
    report
}
