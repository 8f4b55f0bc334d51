//! Start-Path Prober
//!
//! Picks a landing directory on a freshly opened remote session. Candidates
//! are checked with stat; bridges without stat fall back to listing each
//! candidate. Probe failures only skip to the next candidate.

use std::sync::Arc;

use tracing::debug;

use crate::bridge::{Bridge, SessionHandle};

/// Landing directory when no candidate exists
pub const FALLBACK_START_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeMode {
    Stat,
    List,
}

#[derive(Clone)]
pub struct StartPathProber {
    bridge: Arc<dyn Bridge>,
}

impl StartPathProber {
    pub fn new(bridge: Arc<dyn Bridge>) -> Self {
        Self { bridge }
    }

    /// Candidate directories for `username`, most plausible first
    pub fn candidates(username: &str) -> Vec<String> {
        let username = username.trim();
        if username.is_empty() || username == "root" {
            vec!["/root".to_string()]
        } else {
            vec![format!("/home/{}", username), "/root".to_string()]
        }
    }

    pub async fn probe(
        &self,
        handle: &SessionHandle,
        username: &str,
        encoding: Option<&str>,
    ) -> String {
        let mut mode = ProbeMode::Stat;

        for candidate in Self::candidates(username) {
            if mode == ProbeMode::Stat {
                match self.bridge.stat_remote_path(handle, &candidate, encoding).await {
                    Ok(stat) if stat.is_dir() => {
                        debug!("Start path found via stat: {}", candidate);
                        return candidate;
                    }
                    Ok(_) => {
                        debug!("Start path candidate {} is not a directory", candidate);
                        continue;
                    }
                    Err(e) if e.is_unsupported() => {
                        debug!("Bridge has no stat, probing by listing");
                        mode = ProbeMode::List;
                    }
                    Err(e) => {
                        debug!("Start path candidate {} skipped: {}", candidate, e);
                        continue;
                    }
                }
            }

            match self
                .bridge
                .list_remote_directory(handle, &candidate, encoding)
                .await
            {
                Ok(_) => {
                    debug!("Start path found via listing: {}", candidate);
                    return candidate;
                }
                Err(e) => debug!("Start path candidate {} skipped: {}", candidate, e),
            }
        }

        FALLBACK_START_PATH.to_string()
    }
}
