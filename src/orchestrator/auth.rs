//! Authentication attempt plan
//!
//! With key material: one key attempt (password stripped unless sudo needs
//! it), then at most one password-only retry when the key attempt was an
//! authentication rejection and a password is available. Without key
//! material: one password attempt.

use tracing::{debug, info};

use crate::bridge::{Bridge, BridgeError, SessionHandle, SessionRequest};
use crate::credentials::{HostRecord, ResolvedCredentials};

/// Build the bridge request for one connect attempt
pub(crate) fn build_request(
    connection_id: &str,
    host: &HostRecord,
    credentials: ResolvedCredentials,
) -> SessionRequest {
    SessionRequest {
        session_id: connection_id.to_string(),
        hostname: host.hostname.clone(),
        port: host.port_or_default(),
        username: credentials.username,
        password: credentials.password,
        private_key: credentials.private_key,
        certificate: credentials.certificate,
        public_key: credentials.public_key,
        passphrase: credentials.passphrase,
        proxy: credentials.proxy,
        jump_hosts: credentials.jump_hosts,
        sudo: credentials.sudo,
    }
}

pub(crate) async fn open_session(
    bridge: &dyn Bridge,
    request: &SessionRequest,
) -> Result<SessionHandle, BridgeError> {
    if !request.has_key() {
        debug!("Opening session {} with password", request.session_id);
        return bridge.open_remote_session(request).await;
    }

    let key_attempt = if request.sudo {
        request.clone()
    } else {
        request.clone().key_only()
    };

    debug!("Opening session {} with key", request.session_id);
    match bridge.open_remote_session(&key_attempt).await {
        Ok(handle) => Ok(handle),
        Err(e) if request.has_password() && e.is_auth_rejection() => {
            info!(
                "Key rejected for {}@{}, retrying with password",
                request.username, request.hostname
            );
            bridge
                .open_remote_session(&request.clone().password_only())
                .await
        }
        Err(e) => Err(e),
    }
}
