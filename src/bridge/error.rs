//! Bridge error types

use thiserror::Error;

/// Message fragments that identify an authentication rejection when a bridge
/// only reports free text.
const AUTH_REJECTION_MARKERS: [&str; 4] = ["authentication", "auth", "password", "permission denied"];

#[derive(Error, Debug, Clone)]
pub enum BridgeError {
    /// The capability is not provided by this bridge
    #[error("Bridge capability unavailable: {0}")]
    Unsupported(&'static str),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(String),

    /// Free-form failure reported by the bridge
    #[error("{0}")]
    Other(String),
}

impl BridgeError {
    pub fn other(message: impl Into<String>) -> Self {
        BridgeError::Other(message.into())
    }

    /// Whether this failure is an authentication rejection.
    ///
    /// The structured variant is authoritative. Bridges that only surface text
    /// are matched case-insensitively on the rejection markers.
    pub fn is_auth_rejection(&self) -> bool {
        if matches!(self, BridgeError::AuthenticationFailed(_)) {
            return true;
        }
        let message = self.to_string().to_lowercase();
        AUTH_REJECTION_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, BridgeError::Unsupported(_))
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => BridgeError::NotFound(err.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                BridgeError::Io(format!("Permission denied: {}", err))
            }
            _ => BridgeError::Io(err.to_string()),
        }
    }
}

impl From<russh::Error> for BridgeError {
    fn from(err: russh::Error) -> Self {
        BridgeError::ConnectionFailed(err.to_string())
    }
}

impl From<russh_sftp::client::error::Error> for BridgeError {
    fn from(err: russh_sftp::client::error::Error) -> Self {
        BridgeError::Io(err.to_string())
    }
}

// Serialized as its display string for UI consumers
impl serde::Serialize for BridgeError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
