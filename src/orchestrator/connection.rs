//! Connect / disconnect state machine
//!
//! ```text
//! Idle ──connect──► Connecting ──► Connected
//!                        │
//!                        └──────► Error
//! any ──disconnect──► Idle (tab reset in place)
//! ```
//!
//! Every operation takes a ticket first. Results are written only through
//! generation-checked commits; a superseded operation closes whatever session
//! it opened and purges whatever it cached.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::auth;
use super::error::{OrchestratorError, Outcome};
use crate::bridge::{Bridge, BridgeError};
use crate::config::OrchestratorSettings;
use crate::credentials::{resolve, CredentialLibrary, CredentialOverride, HostRecord};
use crate::listing::path_utils::{normalize_local_path, normalize_remote_path};
use crate::listing::{CacheEntry, CacheKey, DirectoryCache, DirectoryLister, FileEntry};
use crate::pane::{ConnectTarget, Connection, ConnectionStatus, PaneSide, PaneStore, Tab};
use crate::session::{
    ReconnectSupervisor, ReconnectTarget, RequestSequencer, SessionRegistry, StartPathProber,
    Ticket,
};

/// Shown on a connection whose attempt was taken over by newer work
const SUPERSEDED_MESSAGE: &str = "Connection attempt superseded";

/// Who started a connect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ConnectMode {
    /// User request: clears the listing and ends any reconnect loop
    Fresh,
    /// Reconnect Supervisor retry: keeps the previous listing on screen
    Reconnect,
}

/// Local home when the bridge cannot report one
pub(crate) fn default_local_home() -> String {
    if cfg!(windows) {
        r"C:\Users\user".to_string()
    } else {
        "/Users/user".to_string()
    }
}

pub(crate) struct OrchestratorInner {
    pub(super) bridge: Arc<dyn Bridge>,
    pub(super) settings: OrchestratorSettings,
    pub(super) library: RwLock<CredentialLibrary>,
    pub(super) lister: DirectoryLister,
    pub(super) prober: StartPathProber,
    pub(super) cache: DirectoryCache,
    pub(super) registry: SessionRegistry,
    pub(super) sequencer: RequestSequencer,
    pub(super) store: PaneStore,
    pub(super) last_targets: DashMap<PaneSide, ConnectTarget>,
    pub(super) supervisor: ReconnectSupervisor,
}

impl OrchestratorInner {
    pub(super) fn new(bridge: Arc<dyn Bridge>, settings: OrchestratorSettings) -> Self {
        Self {
            lister: DirectoryLister::new(bridge.clone()),
            prober: StartPathProber::new(bridge.clone()),
            registry: SessionRegistry::new(bridge.clone()),
            store: PaneStore::new(settings.default_encoding.clone()),
            supervisor: ReconnectSupervisor::new(settings.reconnect_interval()),
            library: RwLock::new(CredentialLibrary::default()),
            cache: DirectoryCache::new(),
            sequencer: RequestSequencer::new(),
            last_targets: DashMap::new(),
            bridge,
            settings,
        }
    }

    pub(super) async fn connect(
        &self,
        side: PaneSide,
        target: ConnectTarget,
        mode: ConnectMode,
    ) -> Result<Outcome, OrchestratorError> {
        if mode == ConnectMode::Fresh {
            self.supervisor.stop(side);
        }
        let tab_id = self.store.ensure_active_tab(side);
        let ticket = self.sequencer.next(side);
        info!(
            "Connecting {} pane to {} (generation {})",
            side,
            target.label(),
            ticket.generation
        );
        self.last_targets.insert(side, target.clone());

        let previous = self.store.tab(side, &tab_id);
        let encoding = previous
            .as_ref()
            .map(|tab| tab.filename_encoding.clone())
            .unwrap_or_else(|| self.settings.default_encoding.clone());
        if let Some(connection) = previous.and_then(|tab| tab.connection) {
            self.release(&connection.id).await;
        }

        match target {
            ConnectTarget::Local => self.connect_local(ticket, &tab_id, &encoding, mode).await,
            ConnectTarget::Remote { host, overrides } => {
                self.connect_remote(ticket, &tab_id, &encoding, mode, host, overrides)
                    .await
            }
        }
    }

    async fn connect_local(
        &self,
        ticket: Ticket,
        tab_id: &str,
        encoding: &str,
        mode: ConnectMode,
    ) -> Result<Outcome, OrchestratorError> {
        let home = match self.bridge.get_local_home_directory().await {
            Ok(Some(home)) => home,
            Ok(None) => default_local_home(),
            Err(e) => {
                warn!("Local home directory unavailable: {}", e);
                default_local_home()
            }
        };

        let connection = Connection::local(&home);
        let connection_id = connection.id.clone();
        if self
            .store
            .commit(&self.sequencer, &ticket, tab_id, |tab| {
                begin_connection(tab, connection, mode)
            })
            .is_none()
        {
            return Ok(Outcome::Superseded);
        }

        match self.lister.list_local(&home).await {
            Ok(files) => {
                let key = CacheKey::new(&connection_id, normalize_local_path(&home), encoding);
                Ok(self
                    .finish(&ticket, tab_id, &connection_id, key, files, |_| {})
                    .await)
            }
            Err(e) => {
                warn!("Listing local home {} failed: {}", home, e);
                self.fail(&ticket, tab_id, &connection_id, e, false).await
            }
        }
    }

    async fn connect_remote(
        &self,
        ticket: Ticket,
        tab_id: &str,
        encoding: &str,
        mode: ConnectMode,
        host: HostRecord,
        overrides: Option<CredentialOverride>,
    ) -> Result<Outcome, OrchestratorError> {
        let connection = Connection::remote(&host);
        let connection_id = connection.id.clone();
        if self
            .store
            .commit(&self.sequencer, &ticket, tab_id, |tab| {
                begin_connection(tab, connection, mode)
            })
            .is_none()
        {
            return Ok(Outcome::Superseded);
        }

        let credentials = {
            let library = self.library.read();
            resolve(&host, &library, overrides.as_ref())
        };
        let username = credentials.username.clone();
        let request = auth::build_request(&connection_id, &host, credentials);

        let handle = match auth::open_session(self.bridge.as_ref(), &request).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Connecting to {} failed: {}", host.label, e);
                return self.fail(&ticket, tab_id, &connection_id, e, true).await;
            }
        };
        if let Some(replaced) = self.registry.set(&connection_id, handle.clone()) {
            warn!("Connection {} already had session {}", connection_id, replaced);
            if let Err(e) = self.bridge.close_remote_session(&replaced).await {
                warn!("Failed to close replaced session {}: {}", replaced, e);
            }
        }
        if !self.sequencer.is_current(&ticket) {
            self.abandon(&ticket, tab_id, &connection_id).await;
            return Ok(Outcome::Superseded);
        }

        let landing = self.prober.probe(&handle, &username, Some(encoding)).await;
        if !self.sequencer.is_current(&ticket) {
            self.abandon(&ticket, tab_id, &connection_id).await;
            return Ok(Outcome::Superseded);
        }

        match self
            .lister
            .list_remote(&handle, &landing, Some(encoding))
            .await
        {
            Ok(files) => {
                info!("Connected to {} at {}", host.label, landing);
                let key = CacheKey::new(&connection_id, normalize_remote_path(&landing), encoding);
                Ok(self
                    .finish(&ticket, tab_id, &connection_id, key, files, |connection| {
                        connection.status = ConnectionStatus::Connected;
                        connection.current_path = landing.clone();
                        connection.home_dir = Some(landing.clone());
                    })
                    .await)
            }
            Err(e) => {
                warn!("Listing {} on {} failed: {}", landing, host.label, e);
                self.fail(&ticket, tab_id, &connection_id, e, true).await
            }
        }
    }

    /// Cache the landing listing and write the connected state
    async fn finish<F>(
        &self,
        ticket: &Ticket,
        tab_id: &str,
        connection_id: &str,
        key: CacheKey,
        files: Vec<FileEntry>,
        update_connection: F,
    ) -> Outcome
    where
        F: FnOnce(&mut Connection),
    {
        if !self.sequencer.is_current(ticket) {
            self.abandon(ticket, tab_id, connection_id).await;
            return Outcome::Superseded;
        }
        self.cache.put(key, CacheEntry::new(files.clone()));

        let committed = self.store.commit(&self.sequencer, ticket, tab_id, |tab| {
            if let Some(connection) = tab.connection.as_mut() {
                update_connection(connection);
            }
            tab.files = files;
            tab.loading = false;
            tab.reconnecting = false;
            tab.error = None;
        });
        if committed.is_none() {
            self.abandon(ticket, tab_id, connection_id).await;
            return Outcome::Superseded;
        }
        Outcome::Applied
    }

    /// Record a failure on the tab; remote failures also mark the connection
    async fn fail(
        &self,
        ticket: &Ticket,
        tab_id: &str,
        connection_id: &str,
        error: BridgeError,
        mark_connection: bool,
    ) -> Result<Outcome, OrchestratorError> {
        let message = error.to_string();
        let committed = self.store.commit(&self.sequencer, ticket, tab_id, |tab| {
            if mark_connection {
                if let Some(connection) = tab.connection.as_mut() {
                    connection.status = ConnectionStatus::Error;
                    connection.error = Some(message.clone());
                }
            }
            tab.loading = false;
            tab.error = Some(message);
        });
        match committed {
            Some(_) => Err(error.into()),
            None => {
                self.abandon(ticket, tab_id, connection_id).await;
                Ok(Outcome::Superseded)
            }
        }
    }

    pub(super) async fn disconnect(&self, side: PaneSide) -> Outcome {
        let ticket = self.sequencer.next(side);
        self.supervisor.stop(side);
        self.last_targets.remove(&side);

        let Some(tab) = self.store.active_tab(side) else {
            return Outcome::Unchanged;
        };
        if let Some(connection) = tab.connection.as_ref() {
            info!("Disconnecting {} pane from {}", side, connection.host_label);
            self.release(&connection.id).await;
        }

        match self
            .store
            .commit(&self.sequencer, &ticket, &tab.id, Tab::reset)
        {
            Some(_) => Outcome::Applied,
            None => Outcome::Superseded,
        }
    }

    /// Close the session of a connection being torn down and drop its cache
    async fn release(&self, connection_id: &str) {
        self.registry.close_and_forget(connection_id).await;
        self.cache.purge(connection_id);
    }

    /// Clean up after a superseded connect on `tab_id`.
    ///
    /// A connection the tab still shows as connected was taken over by a
    /// navigation on it and stays live. Anything else is released, and a tab
    /// no newer operation has written to is taken out of its loading state.
    async fn abandon(&self, ticket: &Ticket, tab_id: &str, connection_id: &str) {
        debug!(
            "Connection {} superseded on {} pane (generation {})",
            connection_id, ticket.side, ticket.generation
        );
        let live = self
            .store
            .tab(ticket.side, tab_id)
            .and_then(|tab| tab.connection)
            .is_some_and(|connection| connection.id == connection_id && connection.is_connected());
        if !live {
            self.release(connection_id).await;
        }

        self.store.settle(ticket, tab_id, connection_id, |tab| {
            tab.loading = false;
            if let Some(connection) = tab.connection.as_mut().filter(|c| !c.is_connected()) {
                connection.status = ConnectionStatus::Error;
                connection.error = Some(SUPERSEDED_MESSAGE.to_string());
                tab.error = Some(SUPERSEDED_MESSAGE.to_string());
            }
        });
    }

    pub(super) fn set_reconnecting(&self, side: PaneSide, reconnecting: bool) -> bool {
        let Some(tab) = self.store.active_tab(side) else {
            return false;
        };
        self.store
            .update(side, &tab.id, |tab| tab.reconnecting = reconnecting)
            .is_some()
    }
}

/// Fresh connect clears the listing; a reconnect keeps the previous one
fn begin_connection(tab: &mut Tab, connection: Connection, mode: ConnectMode) {
    tab.connection = Some(connection);
    tab.loading = true;
    tab.error = None;
    if mode == ConnectMode::Fresh {
        tab.reconnecting = false;
        tab.files.clear();
    }
}

#[async_trait]
impl ReconnectTarget for OrchestratorInner {
    fn is_reconnecting(&self, side: PaneSide) -> bool {
        self.store
            .active_tab(side)
            .is_some_and(|tab| tab.reconnecting)
    }

    async fn reconnect(&self, side: PaneSide) {
        let Some(target) = self.last_targets.get(&side).map(|t| t.value().clone()) else {
            debug!("No last target for {} pane, clearing reconnect flag", side);
            self.set_reconnecting(side, false);
            return;
        };
        if let Err(e) = self.connect(side, target, ConnectMode::Reconnect).await {
            warn!("Reconnect of {} pane failed: {}", side, e);
        }
    }
}
