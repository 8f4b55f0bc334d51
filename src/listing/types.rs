//! Listing data types

use serde::{Deserialize, Serialize};

/// File type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Directory,
    Symlink,
}

impl FileKind {
    /// Map the bridge's free-form type string. Unknown kinds are files.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "directory" | "dir" | "folder" | "d" => FileKind::Directory,
            "symlink" | "link" | "l" => FileKind::Symlink,
            _ => FileKind::File,
        }
    }
}

/// Canonical directory entry shown in a pane. Always built fresh by the lister.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    /// Size in bytes
    pub size: u64,
    pub size_formatted: String,
    /// Epoch milliseconds, 0 when the raw timestamp could not be parsed
    pub last_modified: i64,
    /// Display string exactly as the bridge reported it
    pub last_modified_formatted: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_target: Option<String>,
    /// Only set for local entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

impl FileEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}
