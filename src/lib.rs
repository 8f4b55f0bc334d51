//! TwinPane - dual-pane session orchestration
//!
//! Drives two independent panes, each a set of tabs bound to either the local
//! filesystem or a remote SFTP session, behind a [`bridge::Bridge`].

pub mod bridge;
pub mod config;
pub mod credentials;
pub mod listing;
pub mod orchestrator;
pub mod pane;
pub mod session;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use bridge::{Bridge, BridgeError, NativeBridge, NullBridge, SessionHandle};
pub use config::{OrchestratorSettings, SettingsStorage};
pub use orchestrator::{ConnectionOrchestrator, OrchestratorError, Outcome};
pub use pane::{ConnectTarget, PaneEvent, PaneSide};

/// Initialize logging
///
/// `RUST_LOG` wins over `default_level`. Returns false if a global subscriber
/// was already installed.
pub fn init_tracing(default_level: &str) -> bool {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
