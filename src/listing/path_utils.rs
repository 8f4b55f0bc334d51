//! Path helpers for pane navigation and cache keys
//!
//! Remote paths always use `/` (SFTP presents Unix-style paths even for
//! Windows servers). Local paths may be Unix paths, drive-letter paths or
//! UNC paths, regardless of the host platform, because the bridge decides.

/// Check if a local path is absolute.
///
/// Handles Unix paths (`/home/user`), drive letters (`C:\Users`, `D:/data`)
/// and UNC paths (`\\server\share`).
pub fn is_absolute_local_path(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with("\\\\") {
        return true;
    }

    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

pub fn is_absolute_remote_path(path: &str) -> bool {
    path.starts_with('/')
}

/// Join remote path components using `/`
pub fn join_remote_path(base: &str, component: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, component)
    } else {
        format!("{}/{}", base, component)
    }
}

/// Join a local path using the separator the base already uses
pub fn join_local_path(base: &str, component: &str) -> String {
    let sep = local_separator(base);
    if base.ends_with(['/', '\\']) {
        format!("{}{}", base, component)
    } else {
        format!("{}{}{}", base, sep, component)
    }
}

/// Canonical form of a remote path: `.`/`..` resolved, duplicate and
/// trailing slashes removed. Empty input is `/`.
pub fn normalize_remote_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}

/// Canonical form of a local path for cache keys: trailing separators are
/// dropped unless the path is a root (`/`, `C:\`).
pub fn normalize_local_path(path: &str) -> String {
    let trimmed = path.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        return path.chars().next().map(String::from).unwrap_or_default();
    }
    if trimmed.len() == 2 && trimmed.ends_with(':') {
        return format!("{}{}", trimmed, local_separator(path));
    }
    trimmed.to_string()
}

/// Parent of a remote path, `None` at `/`
pub fn remote_parent(path: &str) -> Option<String> {
    let normalized = normalize_remote_path(path);
    if normalized == "/" {
        return None;
    }
    normalized.rsplit_once('/').map(|(parent, _)| {
        if parent.is_empty() {
            "/".to_string()
        } else {
            parent.to_string()
        }
    })
}

/// Parent of a local path, `None` at a root
pub fn local_parent(path: &str) -> Option<String> {
    let normalized = normalize_local_path(path);
    let trimmed = normalized.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() || (trimmed.len() == 2 && trimmed.ends_with(':')) {
        return None;
    }
    let idx = trimmed.rfind(['/', '\\'])?;
    let parent = &trimmed[..idx];
    if parent.is_empty() {
        Some(trimmed[..1].to_string())
    } else if parent.len() == 2 && parent.ends_with(':') {
        Some(format!("{}{}", parent, &trimmed[idx..idx + 1]))
    } else {
        Some(parent.to_string())
    }
}

fn local_separator(path: &str) -> char {
    if path.contains('\\') {
        '\\'
    } else {
        '/'
    }
}
