//! Deterministic sample listing
//!
//! Used by the lister when the bridge has no local-listing capability, so
//! the pane logic stays usable without a live filesystem.

use super::types::{RawEntry, RawSize, RawTimestamp};

/// Canned entries: (name, type, size, modified)
const SAMPLE_ENTRIES: [(&str, &str, u64, &str); 8] = [
    ("Desktop", "directory", 0, "2024-03-12 09:15:00"),
    ("Documents", "directory", 0, "2024-03-10 18:42:31"),
    ("Downloads", "directory", 0, "2024-03-14 11:03:27"),
    ("Projects", "directory", 0, "2024-02-28 16:20:05"),
    (".profile", "file", 807, "2023-11-02 08:00:00"),
    ("notes.md", "file", 2048, "2024-03-13 21:47:12"),
    ("report.pdf", "file", 1_572_864, "2024-01-19 14:30:45"),
    ("archive.tar.gz", "file", 52_428_800, "2023-12-24 10:10:10"),
];

/// Generate the sample listing for `path`.
///
/// Output depends only on `path`: paths less than three segments deep get
/// the full set, deeper paths get the files only.
pub fn generate(path: &str) -> Vec<RawEntry> {
    let depth = path
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && !segment.ends_with(':'))
        .count();

    SAMPLE_ENTRIES
        .iter()
        .filter(|(_, kind, _, _)| depth < 3 || *kind != "directory")
        .map(|(name, kind, size, modified)| RawEntry {
            name: (*name).to_string(),
            entry_type: (*kind).to_string(),
            size: RawSize::Bytes(*size),
            modified: RawTimestamp::Text((*modified).to_string()),
            link_target: None,
            hidden: Some(name.starts_with('.')),
        })
        .collect()
}
