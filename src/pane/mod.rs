//! Pane state
//!
//! Two sides, each holding tabs. The orchestrator only writes the tab an
//! operation started on, and only through generation-checked commits.

mod store;
mod types;

pub use store::{PaneEvent, PaneStore};
pub use types::{ConnectTarget, Connection, ConnectionStatus, Pane, PaneSide, Tab};
