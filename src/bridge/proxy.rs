//! SSH transport for the native bridge
//!
//! Connects the target host directly or through a single-level jump chain
//! using `direct-tcpip` channels (SSH-over-SSH):
//!
//! ```text
//! Client --SSH--> [Jump1] --direct-tcpip--> [Jump2] --direct-tcpip--> [Target]
//! ```
//!
//! - `russh::client::connect_stream()` runs SSH over any AsyncRead + AsyncWrite
//! - `Handle::channel_open_direct_tcpip()` opens the TCP tunnel on a hop
//!
//! Every hop authenticates with its own material: certificate, then key,
//! then password, whichever is present first.

use std::sync::Arc;
use std::time::Duration;

use russh::client::{self, Handle};
use russh::keys::key::PrivateKeyWithHashAlg;
use russh::keys::PublicKey;
use tracing::{debug, info};

use super::error::BridgeError;
use super::types::SessionRequest;
use crate::credentials::JumpHost;

/// Client handler for russh callbacks.
///
/// Host keys are accepted without verification; known-hosts handling belongs
/// to the embedding application.
pub(super) struct ClientHandler {
    host: String,
    port: u16,
}

impl ClientHandler {
    fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
        }
    }
}

impl client::Handler for ClientHandler {
    type Error = BridgeError;

    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        debug!("Accepting host key for {}:{}", self.host, self.port);
        Ok(true)
    }
}

/// One SSH endpoint with its authentication material
#[derive(Clone)]
pub(super) struct Hop {
    pub hostname: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    pub private_key: Option<String>,
    pub certificate: Option<String>,
    pub passphrase: Option<String>,
}

impl Hop {
    pub fn target(request: &SessionRequest) -> Self {
        Self {
            hostname: request.hostname.clone(),
            port: request.port,
            username: request.username.clone(),
            password: request.password.clone(),
            private_key: request.private_key.clone(),
            certificate: request.certificate.clone(),
            passphrase: request.passphrase.clone(),
        }
    }

    pub fn jump(jump: &JumpHost) -> Self {
        Self {
            hostname: jump.hostname.clone(),
            port: jump.port,
            username: jump.username.clone(),
            password: jump.password.clone(),
            private_key: jump.private_key.clone(),
            certificate: jump.certificate.clone(),
            passphrase: jump.passphrase.clone(),
        }
    }
}

/// Authenticated connection to the target plus the jump handles carrying it
pub(super) struct Tunnel {
    pub handle: Handle<ClientHandler>,
    pub jumps: Vec<Handle<ClientHandler>>,
}

fn ssh_config() -> Arc<client::Config> {
    Arc::new(client::Config {
        inactivity_timeout: None,
        keepalive_interval: Some(Duration::from_secs(30)),
        keepalive_max: 3,
        ..Default::default()
    })
}

/// Connect `target`, tunnelling through `jumps` in order
pub(super) async fn connect_chain(
    jumps: &[Hop],
    target: &Hop,
    timeout: Duration,
) -> Result<Tunnel, BridgeError> {
    let mut opened: Vec<Handle<ClientHandler>> = Vec::with_capacity(jumps.len());

    for hop in jumps {
        let handle = match opened.last() {
            None => connect_direct(hop, timeout).await?,
            Some(previous) => connect_via(previous, hop, timeout).await?,
        };
        info!("Jump host {}:{} ready", hop.hostname, hop.port);
        opened.push(handle);
    }

    let handle = match opened.last() {
        None => connect_direct(target, timeout).await?,
        Some(previous) => connect_via(previous, target, timeout).await?,
    };

    Ok(Tunnel {
        handle,
        jumps: opened,
    })
}

async fn connect_direct(hop: &Hop, timeout: Duration) -> Result<Handle<ClientHandler>, BridgeError> {
    info!("Connecting to {}:{}", hop.hostname, hop.port);

    let handler = ClientHandler::new(&hop.hostname, hop.port);
    let mut handle = tokio::time::timeout(
        timeout,
        client::connect(ssh_config(), (hop.hostname.as_str(), hop.port), handler),
    )
    .await
    .map_err(|_| {
        BridgeError::Timeout(format!(
            "Connection to {}:{} timed out",
            hop.hostname, hop.port
        ))
    })??;

    debug!("SSH handshake with {} completed", hop.hostname);
    authenticate(&mut handle, hop).await?;
    Ok(handle)
}

async fn connect_via(
    previous: &Handle<ClientHandler>,
    hop: &Hop,
    timeout: Duration,
) -> Result<Handle<ClientHandler>, BridgeError> {
    info!("Connecting to {}:{} through tunnel", hop.hostname, hop.port);

    let channel = previous
        .channel_open_direct_tcpip(hop.hostname.clone(), hop.port as u32, "127.0.0.1", 0)
        .await
        .map_err(|e| {
            BridgeError::ConnectionFailed(format!(
                "Failed to open tunnel to {}:{}: {}",
                hop.hostname, hop.port, e
            ))
        })?;

    let handler = ClientHandler::new(&hop.hostname, hop.port);
    let mut handle = tokio::time::timeout(
        timeout,
        client::connect_stream(ssh_config(), channel.into_stream(), handler),
    )
    .await
    .map_err(|_| {
        BridgeError::Timeout(format!(
            "Connection to {}:{} via tunnel timed out",
            hop.hostname, hop.port
        ))
    })??;

    debug!("SSH handshake via tunnel with {} completed", hop.hostname);
    authenticate(&mut handle, hop).await?;
    Ok(handle)
}

async fn authenticate(handle: &mut Handle<ClientHandler>, hop: &Hop) -> Result<(), BridgeError> {
    let attempt = if let Some(private_key) = hop.private_key.as_deref() {
        let key = russh::keys::decode_secret_key(private_key, hop.passphrase.as_deref())
            .map_err(|e| BridgeError::AuthenticationFailed(format!("Invalid private key: {}", e)))?;

        match hop.certificate.as_deref() {
            Some(certificate) => {
                debug!("Authenticating {} with certificate", hop.username);
                let cert = russh::keys::ssh_key::Certificate::from_openssh(certificate)
                    .map_err(|e| {
                        BridgeError::AuthenticationFailed(format!("Invalid certificate: {}", e))
                    })?;
                handle
                    .authenticate_openssh_cert(&hop.username, Arc::new(key), cert)
                    .await
            }
            None => {
                debug!("Authenticating {} with key", hop.username);
                let key_with_hash = PrivateKeyWithHashAlg::new(Arc::new(key), None);
                handle
                    .authenticate_publickey(&hop.username, key_with_hash)
                    .await
            }
        }
    } else if let Some(password) = hop.password.as_deref() {
        debug!("Authenticating {} with password", hop.username);
        handle.authenticate_password(&hop.username, password).await
    } else {
        return Err(BridgeError::AuthenticationFailed(format!(
            "No credentials for {}@{}",
            hop.username, hop.hostname
        )));
    };
    let result = attempt.map_err(|e| BridgeError::AuthenticationFailed(e.to_string()))?;

    if !result.success() {
        return Err(BridgeError::AuthenticationFailed(format!(
            "Authentication to {} rejected",
            hop.hostname
        )));
    }

    info!("Authenticated {}@{}", hop.username, hop.hostname);
    Ok(())
}
