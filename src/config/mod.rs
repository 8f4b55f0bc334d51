//! Configuration Module
//!
//! Orchestrator settings and their JSON storage under the user config dir.

mod settings;
mod storage;

pub use settings::{OrchestratorSettings, SETTINGS_VERSION};
pub use storage::{config_dir, settings_file, SettingsStorage, StorageError};
