//! Navigation on an established connection
//!
//! Takes a fresh ticket like connect does, so a newer navigation or a
//! reconnect supersedes an older listing still in flight.

use tracing::{debug, warn};

use super::connection::OrchestratorInner;
use super::error::{OrchestratorError, Outcome};
use crate::bridge::BridgeError;
use crate::listing::path_utils::{
    is_absolute_local_path, is_absolute_remote_path, join_local_path, join_remote_path,
    local_parent, normalize_local_path, normalize_remote_path, remote_parent,
};
use crate::listing::{CacheEntry, CacheKey, FileEntry};
use crate::pane::{Connection, PaneSide, Tab};
use crate::session::Ticket;

impl OrchestratorInner {
    pub(super) async fn navigate(
        &self,
        side: PaneSide,
        path: &str,
    ) -> Result<Outcome, OrchestratorError> {
        self.load_directory(side, Some(path), true).await
    }

    pub(super) async fn navigate_up(&self, side: PaneSide) -> Result<Outcome, OrchestratorError> {
        let (_, connection) = self.connected_tab(side)?;
        let parent = if connection.is_local {
            local_parent(&connection.current_path)
        } else {
            remote_parent(&connection.current_path)
        };
        match parent {
            Some(parent) => self.navigate(side, &parent).await,
            None => Ok(Outcome::Unchanged),
        }
    }

    /// Re-list the current directory, bypassing the cache
    pub(super) async fn refresh(&self, side: PaneSide) -> Result<Outcome, OrchestratorError> {
        self.load_directory(side, None, false).await
    }

    pub(super) async fn set_filename_encoding(
        &self,
        side: PaneSide,
        encoding: &str,
    ) -> Result<Outcome, OrchestratorError> {
        let tab = self
            .store
            .active_tab(side)
            .ok_or(OrchestratorError::NoActiveTab(side))?;
        if tab.filename_encoding == encoding {
            return Ok(Outcome::Unchanged);
        }
        self.store.update(side, &tab.id, |tab| {
            tab.filename_encoding = encoding.to_string();
        });

        if tab.connection.as_ref().is_some_and(Connection::is_connected) {
            self.refresh(side).await
        } else {
            Ok(Outcome::Applied)
        }
    }

    async fn load_directory(
        &self,
        side: PaneSide,
        path: Option<&str>,
        use_cache: bool,
    ) -> Result<Outcome, OrchestratorError> {
        let (tab, connection) = self.connected_tab(side)?;
        let path = resolve_target(&connection, path);
        let ticket = self.sequencer.next(side);
        let key = CacheKey::new(&connection.id, &path, &tab.filename_encoding);

        if use_cache {
            if let Some(entry) = self
                .settings
                .cache_ttl()
                .and_then(|ttl| self.cache.get_fresh(&key, ttl))
            {
                debug!("Serving cached listing of {} on {} pane", path, side);
                return Ok(self.commit_listing(&ticket, &tab.id, &connection.id, path, entry.files));
            }
        }

        if self
            .store
            .commit(&self.sequencer, &ticket, &tab.id, |tab| {
                tab.loading = true;
                tab.error = None;
            })
            .is_none()
        {
            return Ok(Outcome::Superseded);
        }

        let listed = if connection.is_local {
            self.lister.list_local(&path).await
        } else {
            match self.registry.get(&connection.id) {
                Some(handle) => {
                    self.lister
                        .list_remote(&handle, &path, Some(&tab.filename_encoding))
                        .await
                }
                None => Err(BridgeError::SessionNotFound(connection.id.clone())),
            }
        };

        let result = match listed {
            Ok(files) => {
                if !self.sequencer.is_current(&ticket) {
                    Ok(Outcome::Superseded)
                } else {
                    self.cache.put(key, CacheEntry::new(files.clone()));
                    Ok(self.commit_listing(&ticket, &tab.id, &connection.id, path, files))
                }
            }
            Err(e) => {
                warn!("Listing {} on {} pane failed: {}", path, side, e);
                let message = e.to_string();
                let committed = self.store.commit(&self.sequencer, &ticket, &tab.id, |tab| {
                    tab.loading = false;
                    tab.error = Some(message);
                });
                match committed {
                    Some(_) => Err(e.into()),
                    None => Ok(Outcome::Superseded),
                }
            }
        };

        // Work on another tab of this side took over; stop showing the spinner
        if matches!(result, Ok(Outcome::Superseded)) {
            self.store
                .settle(&ticket, &tab.id, &connection.id, |tab| tab.loading = false);
        }
        result
    }

    fn commit_listing(
        &self,
        ticket: &Ticket,
        tab_id: &str,
        connection_id: &str,
        path: String,
        files: Vec<FileEntry>,
    ) -> Outcome {
        let committed = self.store.commit(&self.sequencer, ticket, tab_id, |tab| {
            if let Some(connection) = tab
                .connection
                .as_mut()
                .filter(|connection| connection.id == connection_id)
            {
                connection.current_path = path;
            }
            tab.files = files;
            tab.loading = false;
            tab.error = None;
        });
        match committed {
            Some(_) => Outcome::Applied,
            None => Outcome::Superseded,
        }
    }

    fn connected_tab(&self, side: PaneSide) -> Result<(Tab, Connection), OrchestratorError> {
        let tab = self
            .store
            .active_tab(side)
            .ok_or(OrchestratorError::NoActiveTab(side))?;
        let connection = tab
            .connection
            .clone()
            .filter(Connection::is_connected)
            .ok_or(OrchestratorError::NotConnected(side))?;
        Ok((tab, connection))
    }
}

/// Absolute or relative-to-current target, in canonical form
fn resolve_target(connection: &Connection, path: Option<&str>) -> String {
    let current = connection.current_path.as_str();
    if connection.is_local {
        match path {
            None => normalize_local_path(current),
            Some(p) if is_absolute_local_path(p) => normalize_local_path(p),
            Some(p) => normalize_local_path(&join_local_path(current, p)),
        }
    } else {
        match path {
            None => normalize_remote_path(current),
            Some(p) if is_absolute_remote_path(p) => normalize_remote_path(p),
            Some(p) => normalize_remote_path(&join_remote_path(current, p)),
        }
    }
}
