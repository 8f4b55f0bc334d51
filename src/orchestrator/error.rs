//! Orchestrator error types

use thiserror::Error;

use crate::bridge::BridgeError;
use crate::pane::PaneSide;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("No active tab on {0} pane")]
    NoActiveTab(PaneSide),

    #[error("No active connection on {0} pane")]
    NotConnected(PaneSide),

    #[error("Nothing to reconnect on {0} pane")]
    NoReconnectTarget(PaneSide),
}

impl serde::Serialize for OrchestratorError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// How an operation ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Results were written into the pane
    Applied,
    /// A newer operation on the same side took over; results were dropped
    Superseded,
    /// Nothing to do
    Unchanged,
}
