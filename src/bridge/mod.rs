//! Bridge - the capability boundary to the outside world
//!
//! Everything that touches a filesystem or a network goes through the
//! [`Bridge`] trait. Every capability has a default "absent" implementation,
//! so a bridge only overrides what it actually provides:
//!
//! - `list_local_directory` / `get_local_home_directory` return `Ok(None)`
//!   when absent (lister falls back to mock data / platform default)
//! - `list_remote_directory` returns `Ok(None)` when absent (empty listing)
//! - `open_remote_session` / `close_remote_session` / `stat_remote_path`
//!   return [`BridgeError::Unsupported`] when absent
//!
//! Implementations:
//! - [`NullBridge`] - provides nothing (browser preview, tests)
//! - [`NativeBridge`] - tokio filesystem + russh/russh-sftp sessions

mod error;
pub mod mock_listing;
mod native;
mod proxy;
#[cfg(test)]
pub(crate) mod testing;
mod types;

use async_trait::async_trait;

pub use error::BridgeError;
pub use native::NativeBridge;
pub use types::{
    PathKind, PathStat, RawEntry, RawSize, RawTimestamp, SessionHandle, SessionRequest,
};

/// Capability boundary consumed by the orchestration layer.
///
/// All operations are asynchronous. The orchestrator never assumes a call
/// can be aborted; superseded calls run to completion and their results are
/// discarded by the caller.
#[async_trait]
pub trait Bridge: Send + Sync {
    async fn list_local_directory(&self, _path: &str) -> Result<Option<Vec<RawEntry>>, BridgeError> {
        Ok(None)
    }

    async fn list_remote_directory(
        &self,
        _handle: &SessionHandle,
        _path: &str,
        _encoding: Option<&str>,
    ) -> Result<Option<Vec<RawEntry>>, BridgeError> {
        Ok(None)
    }

    async fn get_local_home_directory(&self) -> Result<Option<String>, BridgeError> {
        Ok(None)
    }

    async fn open_remote_session(
        &self,
        _request: &SessionRequest,
    ) -> Result<SessionHandle, BridgeError> {
        Err(BridgeError::Unsupported("openRemoteSession"))
    }

    async fn close_remote_session(&self, _handle: &SessionHandle) -> Result<(), BridgeError> {
        Err(BridgeError::Unsupported("closeRemoteSession"))
    }

    async fn stat_remote_path(
        &self,
        _handle: &SessionHandle,
        _path: &str,
        _encoding: Option<&str>,
    ) -> Result<PathStat, BridgeError> {
        Err(BridgeError::Unsupported("statRemotePath"))
    }
}

/// Bridge that provides no capabilities at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBridge;

#[async_trait]
impl Bridge for NullBridge {}
