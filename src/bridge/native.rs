//! Native bridge
//!
//! Local capabilities come from `tokio::fs` and `dirs`. Remote sessions are
//! russh connections with an SFTP channel, keyed by an opaque uuid handle.
//!
//! Filename encoding is accepted and ignored: names are decoded as UTF-8.

use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use async_trait::async_trait;
use dashmap::DashMap;
use russh::client::Handle;
use russh_sftp::client::SftpSession;
use tracing::{debug, info, warn};

use super::error::BridgeError;
use super::proxy::{self, ClientHandler, Hop};
use super::types::{PathKind, PathStat, RawEntry, RawSize, RawTimestamp, SessionHandle, SessionRequest};
use super::Bridge;
use crate::config::OrchestratorSettings;
use crate::listing::path_utils::join_remote_path;

struct NativeSession {
    label: String,
    sftp: SftpSession,
    handle: Handle<ClientHandler>,
    /// Jump hosts carrying `handle`, first hop first
    jumps: Vec<Handle<ClientHandler>>,
}

pub struct NativeBridge {
    sessions: DashMap<String, Arc<NativeSession>>,
    connect_timeout: Duration,
}

impl NativeBridge {
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            connect_timeout,
        }
    }

    pub fn from_settings(settings: &OrchestratorSettings) -> Self {
        Self::new(settings.connect_timeout())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn session(&self, handle: &SessionHandle) -> Result<Arc<NativeSession>, BridgeError> {
        self.sessions
            .get(handle.as_str())
            .map(|s| s.value().clone())
            .ok_or_else(|| BridgeError::SessionNotFound(handle.to_string()))
    }
}

impl Default for NativeBridge {
    fn default() -> Self {
        Self::from_settings(&OrchestratorSettings::default())
    }
}

#[async_trait]
impl Bridge for NativeBridge {
    async fn list_local_directory(&self, path: &str) -> Result<Option<Vec<RawEntry>>, BridgeError> {
        let mut dir = tokio::fs::read_dir(path).await?;
        let mut entries = Vec::new();

        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = entry.file_type().await?;
            // Does not follow symlinks, so dangling links still list
            let metadata = entry.metadata().await.ok();

            let (entry_type, link_target) = if file_type.is_symlink() {
                let target = tokio::fs::read_link(entry.path())
                    .await
                    .ok()
                    .map(|p| p.to_string_lossy().into_owned());
                ("symlink", target)
            } else if file_type.is_dir() {
                ("directory", None)
            } else {
                ("file", None)
            };

            let size = metadata.as_ref().map(|m| m.len()).unwrap_or(0);
            let modified = metadata
                .and_then(|m| m.modified().ok())
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0);

            entries.push(RawEntry {
                name,
                entry_type: entry_type.to_string(),
                size: RawSize::Bytes(size),
                modified: RawTimestamp::Epoch(modified),
                link_target,
                hidden: None,
            });
        }

        Ok(Some(entries))
    }

    async fn list_remote_directory(
        &self,
        handle: &SessionHandle,
        path: &str,
        _encoding: Option<&str>,
    ) -> Result<Option<Vec<RawEntry>>, BridgeError> {
        let session = self.session(handle)?;
        let read_dir = session.sftp.read_dir(path).await?;
        let mut entries = Vec::new();

        for entry in read_dir {
            let name = entry.file_name();
            if name == "." || name == ".." {
                continue;
            }

            let metadata = entry.metadata();
            let entry_type = if metadata.is_dir() {
                "directory"
            } else if metadata.is_symlink() {
                "symlink"
            } else {
                "file"
            };
            let link_target = if metadata.is_symlink() {
                session
                    .sftp
                    .read_link(join_remote_path(path, &name))
                    .await
                    .ok()
            } else {
                None
            };

            entries.push(RawEntry {
                name,
                entry_type: entry_type.to_string(),
                size: RawSize::Bytes(metadata.size.unwrap_or(0)),
                modified: RawTimestamp::Epoch(metadata.mtime.map(|t| t as i64).unwrap_or(0)),
                link_target,
                hidden: None,
            });
        }

        debug!("Listed {} entries in {} on {}", entries.len(), path, session.label);
        Ok(Some(entries))
    }

    async fn get_local_home_directory(&self) -> Result<Option<String>, BridgeError> {
        Ok(dirs::home_dir().map(|p| p.to_string_lossy().into_owned()))
    }

    async fn open_remote_session(
        &self,
        request: &SessionRequest,
    ) -> Result<SessionHandle, BridgeError> {
        if let Some(proxy) = &request.proxy {
            warn!(
                "{} proxy {}:{} is not supported, connecting without it",
                proxy.kind, proxy.host, proxy.port
            );
        }

        let jumps: Vec<Hop> = request.jump_hosts.iter().map(Hop::jump).collect();
        let tunnel = proxy::connect_chain(&jumps, &Hop::target(request), self.connect_timeout).await?;

        let channel = tunnel.handle.channel_open_session().await?;
        channel.request_subsystem(true, "sftp").await?;
        let sftp = SftpSession::new(channel.into_stream()).await?;

        let label = format!("{}@{}:{}", request.username, request.hostname, request.port);
        let token = uuid::Uuid::new_v4().to_string();
        info!("SFTP session {} opened for {}", token, label);

        self.sessions.insert(
            token.clone(),
            Arc::new(NativeSession {
                label,
                sftp,
                handle: tunnel.handle,
                jumps: tunnel.jumps,
            }),
        );
        Ok(SessionHandle::new(token))
    }

    async fn close_remote_session(&self, handle: &SessionHandle) -> Result<(), BridgeError> {
        let (_, session) = self
            .sessions
            .remove(handle.as_str())
            .ok_or_else(|| BridgeError::SessionNotFound(handle.to_string()))?;

        if let Err(e) = session.sftp.close().await {
            debug!("SFTP close for {} failed: {}", session.label, e);
        }
        disconnect_chain(&session.label, &session.handle, session.jumps.as_slice(), |handle| {
            handle.disconnect(russh::Disconnect::ByApplication, "", "en")
        })
        .await;

        info!("SFTP session {} closed ({})", handle, session.label);
        Ok(())
    }

    async fn stat_remote_path(
        &self,
        handle: &SessionHandle,
        path: &str,
        _encoding: Option<&str>,
    ) -> Result<PathStat, BridgeError> {
        let session = self.session(handle)?;
        let metadata = session.sftp.metadata(path).await?;
        let kind = if metadata.is_dir() {
            PathKind::Directory
        } else if metadata.is_symlink() {
            PathKind::Symlink
        } else if metadata.is_regular() {
            PathKind::File
        } else {
            PathKind::Other
        };
        Ok(PathStat { kind })
    }
}

/// Disconnect the target, then its jump hosts last hop first. A failed
/// disconnect is logged and the rest of the chain is still torn down.
async fn disconnect_chain<'a, H, F, Fut, E>(
    label: &str,
    target: &'a H,
    jumps: &'a [H],
    disconnect: F,
) where
    F: Fn(&'a H) -> Fut,
    Fut: std::future::Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    if let Err(e) = disconnect(target).await {
        debug!("Disconnect for {} failed: {}", label, e);
    }
    for jump in jumps.iter().rev() {
        if let Err(e) = disconnect(jump).await {
            debug!("Jump host disconnect for {} failed: {}", label, e);
        }
    }
}
