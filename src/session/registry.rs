//! Session Registry
//!
//! Maps connection ids to the bridge's session handles. A handle is removed
//! from the map before its close is issued, so whichever path tears a session
//! down first is the only one that reaches the bridge.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::bridge::{Bridge, SessionHandle};

pub struct SessionRegistry {
    bridge: Arc<dyn Bridge>,
    handles: DashMap<String, SessionHandle>,
}

impl SessionRegistry {
    pub fn new(bridge: Arc<dyn Bridge>) -> Self {
        Self {
            bridge,
            handles: DashMap::new(),
        }
    }

    /// Register `handle` for `connection_id`.
    ///
    /// Returns a handle previously registered under the same id, which the
    /// caller now owns and must close.
    pub fn set(&self, connection_id: &str, handle: SessionHandle) -> Option<SessionHandle> {
        debug!("Registered session {} for connection {}", handle, connection_id);
        self.handles.insert(connection_id.to_string(), handle)
    }

    pub fn get(&self, connection_id: &str) -> Option<SessionHandle> {
        self.handles.get(connection_id).map(|h| h.value().clone())
    }

    pub fn contains(&self, connection_id: &str) -> bool {
        self.handles.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Close and unregister the session of `connection_id`.
    ///
    /// No-op for unknown ids. Close failures are logged and swallowed; the
    /// mapping is gone either way.
    pub async fn close_and_forget(&self, connection_id: &str) {
        let Some((_, handle)) = self.handles.remove(connection_id) else {
            return;
        };

        match self.bridge.close_remote_session(&handle).await {
            Ok(()) => debug!("Closed session {} of connection {}", handle, connection_id),
            Err(e) => warn!(
                "Failed to close session {} of connection {}: {}",
                handle, connection_id, e
            ),
        }
    }

    /// Close every registered session (shutdown path)
    pub async fn close_all(&self) {
        let ids: Vec<String> = self.handles.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            self.close_and_forget(&id).await;
        }
    }
}
