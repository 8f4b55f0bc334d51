//! Credential Resolver
//!
//! Turns a saved host plus the key/identity tables into the layered
//! credential set used for one connect attempt. No I/O.

mod resolver;
mod types;

pub use resolver::resolve;
pub use types::{
    AuthKind, CredentialLibrary, CredentialOverride, HostRecord, Identity, JumpHost, KeyRecord,
    ProxyConfig, ResolvedCredentials, DEFAULT_JUMP_USERNAME, DEFAULT_SSH_PORT,
};
