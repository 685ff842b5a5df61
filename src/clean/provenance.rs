//! Origin labels derived from artifact paths.

use std::path::{Component, Path};

use crate::config::SourceNames;

/// Build the origin label for a file.
///
/// The first path component that names a known source selects its label;
/// the components after it, minus the file name, are appended with `/`.
/// Sources configured to strip extensions keep the file's stem instead of
/// dropping the file name. Paths matching no source fall back to the
/// configured unknown-origin label, or to the bare file name.
pub fn origin<P: AsRef<Path>>(path: P, sources: &SourceNames) -> String {
    let path = path.as_ref();
    let parts: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    for (i, part) in parts.iter().enumerate() {
        let Some(label) = sources.label(part) else {
            continue;
        };

        let mut sub_path: Vec<String> = parts[i + 1..].to_vec();
        if sources.strips_extension(part) {
            if let Some(last) = sub_path.last_mut() {
                *last = strip_extension(last);
            }
        } else {
            sub_path.pop();
        }

        return if sub_path.is_empty() {
            label.to_string()
        } else {
            format!("{}/{}", label, sub_path.join("/"))
        };
    }

    match sources.unknown_origin() {
        Some(label) => label.to_string(),
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
    }
}

fn strip_extension(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources() -> SourceNames {
        SourceNames::new([
            ("3gpp_spec", "3GPP"),
            ("arxiv", "arXiv"),
            ("itu", "ITU"),
        ])
    }

    #[test]
    fn test_origin_drops_file_name() {
        assert_eq!(
            origin(
                "data/parsed/3gpp_spec/Rel-17/29_series/file.zip/doc.docx",
                &sources()
            ),
            "3GPP/Rel-17/29_series/file.zip"
        );
    }

    #[test]
    fn test_origin_directly_under_source() {
        assert_eq!(origin("parsed/itu/T-REC-G.989.json", &sources()), "ITU");
    }

    #[test]
    fn test_origin_keeps_stem_for_arxiv() {
        assert_eq!(
            origin("parsed/arxiv/cs.NI/2401.01234v2.json", &sources()),
            "arXiv/cs.NI/2401.01234v2"
        );
    }

    #[test]
    fn test_first_matching_component_wins() {
        assert_eq!(
            origin("parsed/itu/mirror/3gpp_spec/x.json", &sources()),
            "ITU/mirror/3gpp_spec"
        );
    }

    #[test]
    fn test_unknown_origin() {
        assert_eq!(origin("parsed/misc/notes.json", &sources()), "notes.json");
        let sources = sources().with_unknown_origin("Unknown");
        assert_eq!(origin("parsed/misc/notes.json", &sources), "Unknown");
    }

    #[test]
    fn test_partial_segment_does_not_match() {
        assert_eq!(origin("parsed/itu_old/a.json", &sources()), "a.json");
    }
}
