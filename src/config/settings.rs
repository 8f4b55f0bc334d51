//! Orchestrator settings

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Current settings file version
pub const SETTINGS_VERSION: u32 = 1;

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_reconnect_interval_ms() -> u64 {
    1000
}

fn default_cache_ttl_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_encoding() -> String {
    "auto".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorSettings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Wait between reconnect attempts
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,

    /// Maximum age of a cached listing served by navigation (0 = never serve)
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// TCP + SSH handshake timeout for the native bridge
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Filename encoding for newly created tabs
    #[serde(default = "default_encoding")]
    pub default_encoding: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            reconnect_interval_ms: default_reconnect_interval_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            default_encoding: default_encoding(),
        }
    }
}

impl OrchestratorSettings {
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    /// `None` when cache reads are disabled
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
