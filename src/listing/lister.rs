//! Directory Lister
//!
//! One entry shape for local and remote listings. Local listing falls back
//! to the deterministic mock generator when the bridge cannot list; remote
//! listing has no fallback and yields an empty list instead.

use std::sync::Arc;

use tracing::debug;

use super::format::{format_size, parse_size, parse_timestamp};
use super::types::{FileEntry, FileKind};
use crate::bridge::{mock_listing, Bridge, BridgeError, RawEntry, SessionHandle};

/// Placeholder shown instead of a size for directories
const DIRECTORY_SIZE_PLACEHOLDER: &str = "-";

#[derive(Clone)]
pub struct DirectoryLister {
    bridge: Arc<dyn Bridge>,
}

impl DirectoryLister {
    pub fn new(bridge: Arc<dyn Bridge>) -> Self {
        Self { bridge }
    }

    pub async fn list_local(&self, path: &str) -> Result<Vec<FileEntry>, BridgeError> {
        let raw = match self.bridge.list_local_directory(path).await? {
            Some(entries) => entries,
            None => {
                debug!("Local listing unavailable, using sample entries for {}", path);
                mock_listing::generate(path)
            }
        };
        Ok(raw.into_iter().map(|e| normalize(e, true)).collect())
    }

    pub async fn list_remote(
        &self,
        handle: &SessionHandle,
        path: &str,
        encoding: Option<&str>,
    ) -> Result<Vec<FileEntry>, BridgeError> {
        let raw = self
            .bridge
            .list_remote_directory(handle, path, encoding)
            .await?
            .unwrap_or_default();
        Ok(raw.into_iter().map(|e| normalize(e, false)).collect())
    }
}

fn normalize(raw: RawEntry, local: bool) -> FileEntry {
    let kind = FileKind::from_raw(&raw.entry_type);
    let size = parse_size(&raw.size);
    let size_formatted = if kind == FileKind::Directory {
        DIRECTORY_SIZE_PLACEHOLDER.to_string()
    } else {
        format_size(size)
    };
    let (last_modified, last_modified_formatted) = parse_timestamp(&raw.modified);
    let hidden = if local {
        Some(raw.hidden.unwrap_or_else(|| raw.name.starts_with('.')))
    } else {
        None
    };

    FileEntry {
        name: raw.name,
        kind,
        size,
        size_formatted,
        last_modified,
        last_modified_formatted,
        link_target: raw.link_target,
        hidden,
    }
}
