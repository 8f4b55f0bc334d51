//! Session lifecycle primitives
//!
//! - [`SessionRegistry`]: connection id → bridge session handle, closed once
//! - [`RequestSequencer`]: per-side generations for stale-result detection
//! - [`StartPathProber`]: landing directory discovery on new sessions
//! - [`ReconnectSupervisor`]: per-side retry loop while a pane is reconnecting

mod prober;
mod reconnect;
mod registry;
mod sequencer;

pub use prober::{StartPathProber, FALLBACK_START_PATH};
pub use reconnect::{ReconnectSupervisor, ReconnectTarget, DEFAULT_RECONNECT_INTERVAL};
pub use registry::SessionRegistry;
pub use sequencer::{RequestSequencer, Ticket};
