//! Bridge wire types
//!
//! Raw shapes exchanged with the bridge. These are intentionally loose
//! (sizes may arrive as strings, timestamps as formatted text) and are
//! normalised by the directory lister before reaching pane state.

use serde::{Deserialize, Serialize};

use crate::credentials::{JumpHost, ProxyConfig};

/// Opaque token identifying an open remote session at the bridge boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHandle(String);

impl SessionHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Size field as delivered by the bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSize {
    Bytes(u64),
    Text(String),
}

impl Default for RawSize {
    fn default() -> Self {
        RawSize::Bytes(0)
    }
}

/// Modification time as delivered by the bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Unix timestamp in seconds
    Epoch(i64),
    /// Human-readable, already formatted for display
    Text(String),
}

impl Default for RawTimestamp {
    fn default() -> Self {
        RawTimestamp::Text(String::new())
    }
}

/// One directory entry before normalisation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntry {
    pub name: String,
    /// "file", "directory"/"dir", "symlink"/"link"
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub size: RawSize,
    #[serde(default)]
    pub modified: RawTimestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

impl RawEntry {
    pub fn new(name: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry_type: entry_type.into(),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size: RawSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_modified(mut self, modified: RawTimestamp) -> Self {
        self.modified = modified;
        self
    }
}

/// Result of a remote stat call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    File,
    Directory,
    Symlink,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStat {
    #[serde(rename = "type")]
    pub kind: PathKind,
}

impl PathStat {
    pub fn is_dir(&self) -> bool {
        self.kind == PathKind::Directory
    }
}

/// Everything the bridge needs to open one remote session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    /// Label used by the bridge for logging/diagnostics
    pub session_id: String,
    pub hostname: String,
    pub port: u16,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jump_hosts: Vec<JumpHost>,
    #[serde(default)]
    pub sudo: bool,
}

impl SessionRequest {
    /// Whether this request carries key material
    pub fn has_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// Whether a non-empty password is available for a fallback attempt
    pub fn has_password(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Drop the password so the attempt is pure key authentication
    pub fn key_only(mut self) -> Self {
        self.password = None;
        self
    }

    /// Drop all key/certificate fields so the attempt is password-only
    pub fn password_only(mut self) -> Self {
        self.private_key = None;
        self.certificate = None;
        self.public_key = None;
        self.passphrase = None;
        self
    }
}
