//! Online/offline signal and the reconnect-driven sync trigger

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::engine::{SyncEngine, SyncReport};
use crate::Result;

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Shared connectivity flag. Clones observe and drive the same state.
#[derive(Clone, Debug)]
pub struct Connectivity {
    sender: Arc<watch::Sender<bool>>,
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        let (sender, _) = watch::channel(online);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    /// Record the current state. Returns `true` when it changed.
    pub fn set_online(&self, online: bool) -> bool {
        self.sender.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

/// Starts a sync pass whenever the device comes back online.
pub struct ConnectivityMonitor {
    engine: Arc<SyncEngine>,
    settle_delay: Duration,
}

impl ConnectivityMonitor {
    pub const fn new(engine: Arc<SyncEngine>) -> Self {
        Self {
            engine,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Wait this long after reconnecting before syncing.
    #[must_use]
    pub const fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Watch `connectivity` until the returned subscription is dropped or
    /// unsubscribed. Only offline -> online transitions trigger a pass.
    pub fn subscribe(&self, connectivity: &Connectivity) -> MonitorSubscription {
        let mut receiver = connectivity.subscribe();
        // Baseline before spawning: a reconnect ahead of the first poll is still a transition.
        let mut was_online = *receiver.borrow_and_update();
        let engine = Arc::clone(&self.engine);
        let settle_delay = self.settle_delay;

        let task = tokio::spawn(async move {
            while receiver.changed().await.is_ok() {
                let online = *receiver.borrow_and_update();
                if !online {
                    if was_online {
                        tracing::info!("Connection lost; queueing changes locally");
                    }
                    was_online = false;
                    continue;
                }
                if was_online {
                    continue;
                }

                tracing::info!("Connection restored; syncing in {settle_delay:?}");
                tokio::time::sleep(settle_delay).await;
                if !*receiver.borrow() {
                    tracing::debug!("Connection dropped before sync started");
                    was_online = false;
                    continue;
                }
                was_online = true;

                match engine.sync_to_remote().await {
                    Ok(report) => tracing::debug!(
                        "Reconnect sync: {} synced, {} failed",
                        report.synced_count,
                        report.error_count
                    ),
                    Err(error) => tracing::error!("Reconnect sync failed: {error}"),
                }
            }
        });

        MonitorSubscription { task: Some(task) }
    }

    /// Run a pass immediately, subject to the usual offline and in-flight checks.
    pub async fn sync_now(&self) -> Result<SyncReport> {
        self.engine.sync_to_remote().await
    }
}

/// Live reconnect watcher. Dropping it stops the watcher.
#[derive(Debug)]
pub struct MonitorSubscription {
    task: Option<JoinHandle<()>>,
}

impl MonitorSubscription {
    pub fn unsubscribe(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for MonitorSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}
