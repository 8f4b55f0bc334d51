//! RequestSequencer - per-side generation counters
//!
//! Every connect/disconnect/navigate operation takes a [`Ticket`] at its start.
//! A ticket is current only while no later ticket has been issued for the same
//! side; stale tickets must not write pane state.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::pane::PaneSide;

/// Generation captured by one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub side: PaneSide,
    pub generation: u64,
}

/// Monotonic generation counter per pane side.
///
/// Thread-safe: DashMap + AtomicU64, lock-free increment.
pub struct RequestSequencer {
    counters: DashMap<PaneSide, AtomicU64>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self {
            counters: DashMap::new(),
        }
    }

    /// Issue the next ticket for `side`, superseding every earlier one.
    ///
    /// Generations start at 1; 0 means no operation has run yet.
    pub fn next(&self, side: PaneSide) -> Ticket {
        let generation = self
            .counters
            .entry(side)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::SeqCst)
            + 1;
        Ticket { side, generation }
    }

    pub fn current(&self, side: PaneSide) -> u64 {
        self.counters
            .get(&side)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.current(ticket.side) == ticket.generation
    }
}

impl Default for RequestSequencer {
    fn default() -> Self {
        Self::new()
    }
}
