//! Reconnect Supervisor
//!
//! One background loop per pane side while that side is flagged as
//! reconnecting: wait the configured interval, re-check the flag, and if it is
//! still set, run one reconnect attempt. Attempts for a side never overlap;
//! the loop ends when the flag clears, the supervisor is stopped, or the
//! target is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::pane::PaneSide;

/// Default wait between reconnect attempts
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(1);

/// What the supervisor drives
#[async_trait]
pub trait ReconnectTarget: Send + Sync {
    /// Whether `side` is still flagged as reconnecting
    fn is_reconnecting(&self, side: PaneSide) -> bool;

    /// Run one reconnect attempt for `side`
    async fn reconnect(&self, side: PaneSide);
}

struct Run {
    id: u64,
    token: CancellationToken,
}

pub struct ReconnectSupervisor {
    interval: Duration,
    runs: Arc<DashMap<PaneSide, Run>>,
    next_run_id: AtomicU64,
}

impl ReconnectSupervisor {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            runs: Arc::new(DashMap::new()),
            next_run_id: AtomicU64::new(1),
        }
    }

    pub fn is_running(&self, side: PaneSide) -> bool {
        self.runs.contains_key(&side)
    }

    /// Start the loop for `side`. Returns `false` if one is already running.
    pub fn start(&self, side: PaneSide, target: Weak<dyn ReconnectTarget>) -> bool {
        let token = CancellationToken::new();
        let run_id = self.next_run_id.fetch_add(1, Ordering::SeqCst);

        match self.runs.entry(side) {
            dashmap::mapref::entry::Entry::Occupied(_) => return false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Run {
                    id: run_id,
                    token: token.clone(),
                });
            }
        }

        info!("Reconnect supervisor started for {} pane", side);
        let interval = self.interval;
        let runs = self.runs.clone();

        tokio::spawn(async move {
            let mut attempt: u32 = 0;
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!("Reconnect supervisor for {} pane cancelled", side);
                        break;
                    }
                    _ = sleep(interval) => {}
                }

                let Some(target) = target.upgrade() else {
                    break;
                };
                if token.is_cancelled() || !target.is_reconnecting(side) {
                    break;
                }

                attempt += 1;
                info!("Reconnect attempt {} for {} pane", attempt, side);
                target.reconnect(side).await;
            }

            runs.remove_if(&side, |_, run| run.id == run_id);
            info!("Reconnect supervisor stopped for {} pane", side);
        });

        true
    }

    /// Stop the loop for `side`; an attempt already in flight runs to completion
    pub fn stop(&self, side: PaneSide) {
        if let Some((_, run)) = self.runs.remove(&side) {
            run.token.cancel();
        }
    }

    pub fn stop_all(&self) {
        for side in PaneSide::ALL {
            self.stop(side);
        }
    }
}

impl Default for ReconnectSupervisor {
    fn default() -> Self {
        Self::new(DEFAULT_RECONNECT_INTERVAL)
    }
}

impl Drop for ReconnectSupervisor {
    fn drop(&mut self) {
        self.stop_all();
    }
}
