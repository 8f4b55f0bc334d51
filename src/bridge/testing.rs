//! Scripted bridge for tests
//!
//! Records every call and answers from a script. `gate_open` and
//! `gate_local_listing` hold a call until the test releases it, which forces
//! completion orders between overlapping operations.

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::{Bridge, BridgeError, PathKind, PathStat, RawEntry, SessionHandle, SessionRequest};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BridgeCall {
    ListLocal(String),
    ListRemote(SessionHandle, String),
    Home,
    Open(String),
    Close(SessionHandle),
    Stat(String),
}

#[derive(Default)]
struct Script {
    home: Option<String>,
    local_listings: HashMap<String, Vec<RawEntry>>,
    local_failures: HashMap<String, String>,
    local_gates: HashMap<String, oneshot::Receiver<()>>,
    remote_listings: HashMap<String, Vec<RawEntry>>,
    remote_dirs: HashSet<String>,
    stat_disabled: bool,
    open_results: VecDeque<Result<(), BridgeError>>,
    open_gates: HashMap<String, oneshot::Receiver<()>>,
    close_fails: bool,
    next_handle: u64,
}

#[derive(Default)]
pub(crate) struct ScriptedBridge {
    script: Mutex<Script>,
    calls: Mutex<Vec<BridgeCall>>,
    open_requests: Mutex<Vec<SessionRequest>>,
}

impl ScriptedBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_home(&self, path: &str) {
        self.script.lock().home = Some(path.to_string());
    }

    pub fn set_local_listing(&self, path: &str, entries: Vec<RawEntry>) {
        self.script
            .lock()
            .local_listings
            .insert(path.to_string(), entries);
    }

    pub fn fail_local_listing(&self, path: &str, message: &str) {
        self.script
            .lock()
            .local_failures
            .insert(path.to_string(), message.to_string());
    }

    /// Hold the next local listing of `path` until the sender fires
    pub fn gate_local_listing(&self, path: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().local_gates.insert(path.to_string(), rx);
        tx
    }

    /// Remote listing for `path`; also makes `path` stat as a directory
    pub fn set_remote_listing(&self, path: &str, entries: Vec<RawEntry>) {
        let mut script = self.script.lock();
        script.remote_dirs.insert(path.to_string());
        script.remote_listings.insert(path.to_string(), entries);
    }

    pub fn add_remote_dir(&self, path: &str) {
        self.script.lock().remote_dirs.insert(path.to_string());
    }

    pub fn disable_stat(&self) {
        self.script.lock().stat_disabled = true;
    }

    /// Queue the outcome of the next open call (default: success)
    pub fn push_open_result(&self, result: Result<(), BridgeError>) {
        self.script.lock().open_results.push_back(result);
    }

    /// Hold the next open call for `hostname` until the sender fires
    pub fn gate_open(&self, hostname: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.script
            .lock()
            .open_gates
            .insert(hostname.to_string(), rx);
        tx
    }

    pub fn fail_close(&self) {
        self.script.lock().close_fails = true;
    }

    pub fn calls(&self) -> Vec<BridgeCall> {
        self.calls.lock().clone()
    }

    pub fn open_requests(&self) -> Vec<SessionRequest> {
        self.open_requests.lock().clone()
    }

    pub fn closed_handles(&self) -> Vec<SessionHandle> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BridgeCall::Close(handle) => Some(handle),
                _ => None,
            })
            .collect()
    }

    pub fn stat_paths(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BridgeCall::Stat(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: BridgeCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl Bridge for ScriptedBridge {
    async fn list_local_directory(&self, path: &str) -> Result<Option<Vec<RawEntry>>, BridgeError> {
        self.record(BridgeCall::ListLocal(path.to_string()));
        let gate = self.script.lock().local_gates.remove(path);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let script = self.script.lock();
        if let Some(message) = script.local_failures.get(path) {
            return Err(BridgeError::other(message.clone()));
        }
        Ok(script.local_listings.get(path).cloned())
    }

    async fn list_remote_directory(
        &self,
        handle: &SessionHandle,
        path: &str,
        _encoding: Option<&str>,
    ) -> Result<Option<Vec<RawEntry>>, BridgeError> {
        self.record(BridgeCall::ListRemote(handle.clone(), path.to_string()));
        let script = self.script.lock();
        match script.remote_listings.get(path) {
            Some(entries) => Ok(Some(entries.clone())),
            None if script.remote_dirs.contains(path) => Ok(Some(Vec::new())),
            None => Err(BridgeError::NotFound(path.to_string())),
        }
    }

    async fn get_local_home_directory(&self) -> Result<Option<String>, BridgeError> {
        self.record(BridgeCall::Home);
        Ok(self.script.lock().home.clone())
    }

    async fn open_remote_session(
        &self,
        request: &SessionRequest,
    ) -> Result<SessionHandle, BridgeError> {
        self.record(BridgeCall::Open(request.hostname.clone()));
        self.open_requests.lock().push(request.clone());

        let (outcome, gate) = {
            let mut script = self.script.lock();
            let outcome = script.open_results.pop_front().unwrap_or(Ok(()));
            let gate = script.open_gates.remove(&request.hostname);
            (outcome, gate)
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        outcome?;

        let mut script = self.script.lock();
        script.next_handle += 1;
        Ok(SessionHandle::new(format!(
            "{}#{}",
            request.hostname, script.next_handle
        )))
    }

    async fn close_remote_session(&self, handle: &SessionHandle) -> Result<(), BridgeError> {
        self.record(BridgeCall::Close(handle.clone()));
        if self.script.lock().close_fails {
            return Err(BridgeError::other("channel already closed"));
        }
        Ok(())
    }

    async fn stat_remote_path(
        &self,
        _handle: &SessionHandle,
        path: &str,
        _encoding: Option<&str>,
    ) -> Result<PathStat, BridgeError> {
        let script = self.script.lock();
        if script.stat_disabled {
            return Err(BridgeError::Unsupported("statRemotePath"));
        }
        drop(script);

        self.record(BridgeCall::Stat(path.to_string()));
        if self.script.lock().remote_dirs.contains(path) {
            Ok(PathStat {
                kind: PathKind::Directory,
            })
        } else {
            Err(BridgeError::NotFound(path.to_string()))
        }
    }
}
