//! Credential resolution
//!
//! Layering, most specific wins:
//!
//! ```text
//! CredentialOverride  >  linked Identity  >  HostRecord's own fields
//! ```
//!
//! Resolution is pure: the same inputs always give the same output, nothing
//! is cached, and edits to keys/identities take effect on the next call.

use tracing::debug;

use super::types::{
    AuthKind, CredentialLibrary, CredentialOverride, HostRecord, JumpHost, KeyRecord,
    ResolvedCredentials, DEFAULT_JUMP_USERNAME,
};

/// Resolve the credentials for `host`, including its jump chain.
pub fn resolve(
    host: &HostRecord,
    library: &CredentialLibrary,
    overrides: Option<&CredentialOverride>,
) -> ResolvedCredentials {
    let mut resolved = resolve_single(host, library, overrides);
    resolved.jump_hosts = resolve_jump_chain(host, library);
    resolved
}

/// Resolve one host without looking at its jump chain.
fn resolve_single(
    host: &HostRecord,
    library: &CredentialLibrary,
    overrides: Option<&CredentialOverride>,
) -> ResolvedCredentials {
    let identity = host
        .identity_id
        .as_deref()
        .and_then(|id| library.identity(id));

    let username = first_of([
        overrides.and_then(|o| o.username.clone()),
        identity.and_then(|i| i.username.clone()),
        host.username.clone(),
    ])
    .unwrap_or_default();

    let password = first_of([
        overrides.and_then(|o| o.password.clone()),
        identity.and_then(|i| i.password.clone()),
        host.password.clone(),
    ]);

    let key: Option<&KeyRecord> = first_of([
        overrides.and_then(|o| o.key_id.clone()),
        identity.and_then(|i| i.key_id.clone()),
        host.identity_file_id.clone(),
    ])
    .and_then(|key_id| library.key(&key_id));

    let explicit_method = first_of([
        overrides.and_then(|o| o.auth_method),
        identity.and_then(|i| i.auth_method),
        host.auth_method,
    ]);
    let auth_method = explicit_method.unwrap_or(match key {
        Some(k) if k.certificate.is_some() => AuthKind::Certificate,
        Some(_) => AuthKind::Key,
        None => AuthKind::Password,
    });

    let passphrase = overrides
        .and_then(|o| o.passphrase.clone())
        .or_else(|| key.and_then(|k| k.passphrase.clone()));

    ResolvedCredentials {
        username,
        password,
        private_key: key.map(|k| k.private_key.clone()),
        certificate: key.and_then(|k| k.certificate.clone()),
        public_key: key.and_then(|k| k.public_key.clone()),
        passphrase,
        key_id: key.map(|k| k.id.clone()),
        auth_method: Some(auth_method),
        proxy: host.proxy.clone(),
        jump_hosts: Vec::new(),
        sudo: host.sudo,
    }
}

/// Resolve each configured hop independently.
///
/// Single level only: a hop's own jump chain is not followed.
fn resolve_jump_chain(host: &HostRecord, library: &CredentialLibrary) -> Vec<JumpHost> {
    host.jump_host_ids
        .iter()
        .filter_map(|hop_id| {
            let hop = library.host(hop_id);
            if hop.is_none() {
                debug!("Jump host {} not found for {}, skipping", hop_id, host.label);
            }
            hop
        })
        .map(|hop| {
            let creds = resolve_single(hop, library, None);
            let username = if creds.username.is_empty() {
                DEFAULT_JUMP_USERNAME.to_string()
            } else {
                creds.username
            };
            JumpHost {
                hostname: hop.hostname.clone(),
                port: hop.port_or_default(),
                username,
                password: creds.password,
                private_key: creds.private_key,
                certificate: creds.certificate,
                passphrase: creds.passphrase,
                public_key: creds.public_key,
                key_id: creds.key_id,
                label: hop.label.clone(),
            }
        })
        .collect()
}

fn first_of<T, const N: usize>(candidates: [Option<T>; N]) -> Option<T> {
    candidates.into_iter().flatten().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::types::Identity;

    fn library() -> CredentialLibrary {
        CredentialLibrary {
            hosts: vec![
                HostRecord {
                    port: Some(2222),
                    username: Some("jumper".into()),
                    password: Some("jump-pw".into()),
                    ..HostRecord::new("bastion", "Bastion", "bastion.example.com")
                },
                HostRecord {
                    jump_host_ids: vec!["bastion".into()],
                    ..HostRecord::new("inner", "Inner", "inner.example.com")
                },
            ],
            keys: vec![
                KeyRecord {
                    id: "k1".into(),
                    label: "laptop".into(),
                    private_key: "PRIVATE".into(),
                    passphrase: Some("key-pp".into()),
                    ..Default::default()
                },
                KeyRecord {
                    id: "k-cert".into(),
                    label: "ca signed".into(),
                    private_key: "PRIVATE2".into(),
                    certificate: Some("CERT".into()),
                    ..Default::default()
                },
            ],
            identities: vec![Identity {
                id: "ops".into(),
                label: "ops".into(),
                username: Some("ops".into()),
                key_id: Some("k-cert".into()),
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_host_fields_used_when_nothing_else() {
        let host = HostRecord {
            username: Some("deploy".into()),
            password: Some("pw".into()),
            ..HostRecord::new("h", "H", "h.example.com")
        };
        let creds = resolve(&host, &library(), None);
        assert_eq!(creds.username, "deploy");
        assert_eq!(creds.password.as_deref(), Some("pw"));
        assert_eq!(creds.auth_method, Some(AuthKind::Password));
        assert!(creds.private_key.is_none());
    }

    #[test]
    fn test_precedence_override_identity_host() {
        let host = HostRecord {
            username: Some("host-user".into()),
            identity_id: Some("ops".into()),
            identity_file_id: Some("k1".into()),
            ..HostRecord::new("h", "H", "h.example.com")
        };

        let creds = resolve(&host, &library(), None);
        assert_eq!(creds.username, "ops");
        assert_eq!(creds.key_id.as_deref(), Some("k-cert"));
        assert_eq!(creds.auth_method, Some(AuthKind::Certificate));

        let overrides = CredentialOverride {
            username: Some("override".into()),
            key_id: Some("k1".into()),
            ..Default::default()
        };
        let creds = resolve(&host, &library(), Some(&overrides));
        assert_eq!(creds.username, "override");
        assert_eq!(creds.key_id.as_deref(), Some("k1"));
        assert_eq!(creds.auth_method, Some(AuthKind::Key));
        assert_eq!(creds.passphrase.as_deref(), Some("key-pp"));
    }

    #[test]
    fn test_missing_key_falls_back_to_password() {
        let host = HostRecord {
            identity_file_id: Some("deleted-key".into()),
            password: Some("pw".into()),
            ..HostRecord::new("h", "H", "h.example.com")
        };
        let creds = resolve(&host, &library(), None);
        assert!(creds.private_key.is_none());
        assert!(creds.key_id.is_none());
        assert_eq!(creds.auth_method, Some(AuthKind::Password));
        assert_eq!(creds.username, "");
    }

    #[test]
    fn test_override_passphrase_wins_over_key() {
        let host = HostRecord {
            identity_file_id: Some("k1".into()),
            ..HostRecord::new("h", "H", "h.example.com")
        };
        let overrides = CredentialOverride {
            passphrase: Some("typed".into()),
            ..Default::default()
        };
        let creds = resolve(&host, &library(), Some(&overrides));
        assert_eq!(creds.passphrase.as_deref(), Some("typed"));
    }

    #[test]
    fn test_jump_chain_resolves_each_hop() {
        let lib = library();
        let inner = lib.host("inner").unwrap().clone();
        let creds = resolve(&inner, &lib, None);

        assert_eq!(creds.jump_hosts.len(), 1);
        let hop = &creds.jump_hosts[0];
        assert_eq!(hop.hostname, "bastion.example.com");
        assert_eq!(hop.port, 2222);
        assert_eq!(hop.username, "jumper");
        assert_eq!(hop.password.as_deref(), Some("jump-pw"));
        assert_eq!(hop.label, "Bastion");
    }

    #[test]
    fn test_jump_hop_defaults_and_single_level() {
        let mut lib = library();
        lib.hosts.push(HostRecord {
            jump_host_ids: vec!["bastion".into()],
            ..HostRecord::new("bare", "Bare", "bare.example.com")
        });
        let target = HostRecord {
            jump_host_ids: vec!["bare".into(), "missing".into()],
            ..HostRecord::new("t", "T", "t.example.com")
        };

        let creds = resolve(&target, &lib, None);
        assert_eq!(creds.jump_hosts.len(), 1);
        assert_eq!(creds.jump_hosts[0].port, 22);
        assert_eq!(creds.jump_hosts[0].username, "root");
        // bare's own chain through bastion is not expanded
        assert!(creds.jump_hosts.iter().all(|h| h.label != "Bastion"));
    }

    #[test]
    fn test_resolution_is_pure() {
        let lib = library();
        let inner = lib.host("inner").unwrap().clone();
        let overrides = CredentialOverride {
            password: Some("x".into()),
            ..Default::default()
        };
        let first = resolve(&inner, &lib, Some(&overrides));
        let second = resolve(&inner, &lib, Some(&overrides));
        assert_eq!(first, second);
    }
}
