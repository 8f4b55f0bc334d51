//! Pane state types
//!
//! Serialized in camelCase for the UI layer.

use serde::{Deserialize, Serialize};

use crate::credentials::{CredentialOverride, HostRecord};
use crate::listing::FileEntry;

/// One of the two side-by-side workspaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaneSide {
    Left,
    Right,
}

impl PaneSide {
    pub const ALL: [PaneSide; 2] = [PaneSide::Left, PaneSide::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaneSide::Left => "left",
            PaneSide::Right => "right",
        }
    }
}

impl std::fmt::Display for PaneSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Error,
}

/// Logical attachment of a tab to the local filesystem or a remote session.
///
/// `id` is fresh per connect attempt and never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,
    pub host_label: String,
    pub is_local: bool,
    pub status: ConnectionStatus,
    pub current_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Connection {
    pub fn local(home: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            host_id: None,
            host_label: "Local".to_string(),
            is_local: true,
            status: ConnectionStatus::Connected,
            current_path: home.to_string(),
            home_dir: Some(home.to_string()),
            error: None,
        }
    }

    pub fn remote(host: &HostRecord) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            host_id: Some(host.id.clone()),
            host_label: host.label.clone(),
            is_local: false,
            status: ConnectionStatus::Connecting,
            current_path: "/".to_string(),
            home_dir: None,
            error: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }
}

/// One browsing context within a pane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: String,
    pub connection: Option<Connection>,
    pub files: Vec<FileEntry>,
    pub loading: bool,
    pub reconnecting: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub filename_encoding: String,
    /// Generation of the last operation that committed to this tab
    #[serde(skip)]
    pub(crate) written_by: u64,
}

impl Tab {
    pub fn new(filename_encoding: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            connection: None,
            files: Vec::new(),
            loading: false,
            reconnecting: false,
            error: None,
            filename_encoding: filename_encoding.into(),
            written_by: 0,
        }
    }

    /// Back to an empty tab, keeping the id and encoding selector
    pub fn reset(&mut self) {
        self.connection = None;
        self.files.clear();
        self.loading = false;
        self.reconnecting = false;
        self.error = None;
    }

    pub fn connection_id(&self) -> Option<&str> {
        self.connection.as_ref().map(|c| c.id.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pane {
    pub tabs: Vec<Tab>,
    pub active_tab_id: Option<String>,
}

impl Pane {
    pub fn active_tab(&self) -> Option<&Tab> {
        self.tab(self.active_tab_id.as_deref()?)
    }

    pub fn tab(&self, id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn tab_mut(&mut self, id: &str) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }
}

/// What a pane side should be connected to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ConnectTarget {
    Local,
    Remote {
        host: HostRecord,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        overrides: Option<CredentialOverride>,
    },
}

impl ConnectTarget {
    pub fn remote(host: HostRecord) -> Self {
        ConnectTarget::Remote {
            host,
            overrides: None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ConnectTarget::Local => "Local",
            ConnectTarget::Remote { host, .. } => &host.label,
        }
    }
}
