//! Pane Store
//!
//! Owns both panes. Operations write tab state through [`PaneStore::commit`],
//! which checks the caller's ticket against the side's live generation while
//! holding the pane lock, so a superseded operation can never land a write.
//! Every committed write is published as a [`PaneEvent`].

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use super::types::{Pane, PaneSide, Tab};
use crate::session::{RequestSequencer, Ticket};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Published after every committed tab write
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaneEvent {
    pub side: PaneSide,
    pub tab: Tab,
}

pub struct PaneStore {
    panes: Mutex<HashMap<PaneSide, Pane>>,
    events: broadcast::Sender<PaneEvent>,
    default_encoding: String,
}

impl PaneStore {
    pub fn new(default_encoding: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            panes: Mutex::new(HashMap::new()),
            events,
            default_encoding: default_encoding.into(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PaneEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self, side: PaneSide) -> Pane {
        self.panes.lock().get(&side).cloned().unwrap_or_default()
    }

    pub fn active_tab(&self, side: PaneSide) -> Option<Tab> {
        self.panes
            .lock()
            .get(&side)
            .and_then(|pane| pane.active_tab().cloned())
    }

    pub fn tab(&self, side: PaneSide, tab_id: &str) -> Option<Tab> {
        self.panes
            .lock()
            .get(&side)
            .and_then(|pane| pane.tab(tab_id).cloned())
    }

    /// Open a new tab on `side` and make it active
    pub fn open_tab(&self, side: PaneSide) -> String {
        let tab = Tab::new(self.default_encoding.clone());
        let id = tab.id.clone();
        {
            let mut panes = self.panes.lock();
            let pane = panes.entry(side).or_default();
            pane.tabs.push(tab.clone());
            pane.active_tab_id = Some(id.clone());
        }
        self.publish(side, tab);
        id
    }

    /// Make `tab_id` the active tab; `false` if no such tab exists
    pub fn select_tab(&self, side: PaneSide, tab_id: &str) -> bool {
        let mut panes = self.panes.lock();
        let Some(pane) = panes.get_mut(&side) else {
            return false;
        };
        if pane.tabs.iter().any(|t| t.id == tab_id) {
            pane.active_tab_id = Some(tab_id.to_string());
            true
        } else {
            false
        }
    }

    /// Id of the active tab, seeding one if the side has none
    pub fn ensure_active_tab(&self, side: PaneSide) -> String {
        let seeded = {
            let mut panes = self.panes.lock();
            let pane = panes.entry(side).or_default();
            if let Some(tab) = pane.active_tab() {
                return tab.id.clone();
            }
            let tab = Tab::new(self.default_encoding.clone());
            pane.active_tab_id = Some(tab.id.clone());
            pane.tabs.push(tab.clone());
            tab
        };
        debug!("Seeded first tab for {} pane", side);
        let id = seeded.id.clone();
        self.publish(side, seeded);
        id
    }

    /// Apply `update` to `tab_id` if `ticket` is still current.
    ///
    /// Returns the updated tab, or `None` when the ticket is stale or the tab
    /// no longer exists.
    pub fn commit<F>(
        &self,
        sequencer: &RequestSequencer,
        ticket: &Ticket,
        tab_id: &str,
        update: F,
    ) -> Option<Tab>
    where
        F: FnOnce(&mut Tab),
    {
        let tab = {
            let mut panes = self.panes.lock();
            if !sequencer.is_current(ticket) {
                debug!(
                    "Discarding stale write for {} pane (generation {})",
                    ticket.side, ticket.generation
                );
                return None;
            }
            let tab = panes.get_mut(&ticket.side)?.tab_mut(tab_id)?;
            tab.written_by = ticket.generation;
            update(tab);
            tab.clone()
        };
        self.publish(ticket.side, tab.clone());
        Some(tab)
    }

    /// Apply `update` to a tab left behind by a superseded operation.
    ///
    /// Applies only while no later operation has committed to `tab_id` and
    /// the tab still holds `connection_id`, so it never touches state a newer
    /// operation owns.
    pub fn settle<F>(
        &self,
        ticket: &Ticket,
        tab_id: &str,
        connection_id: &str,
        update: F,
    ) -> Option<Tab>
    where
        F: FnOnce(&mut Tab),
    {
        let tab = {
            let mut panes = self.panes.lock();
            let tab = panes.get_mut(&ticket.side)?.tab_mut(tab_id)?;
            if tab.written_by != ticket.generation || tab.connection_id() != Some(connection_id) {
                return None;
            }
            update(tab);
            tab.clone()
        };
        self.publish(ticket.side, tab.clone());
        Some(tab)
    }

    /// Ungated write for user settings that do not race with operations
    pub fn update<F>(&self, side: PaneSide, tab_id: &str, update: F) -> Option<Tab>
    where
        F: FnOnce(&mut Tab),
    {
        let tab = {
            let mut panes = self.panes.lock();
            let tab = panes.get_mut(&side)?.tab_mut(tab_id)?;
            update(tab);
            tab.clone()
        };
        self.publish(side, tab.clone());
        Some(tab)
    }

    fn publish(&self, side: PaneSide, tab: Tab) {
        // No subscribers is fine
        let _ = self.events.send(PaneEvent { side, tab });
    }
}
