//! Remote synchronization
//!
//! Local writes land in the operation queue; `SyncEngine` replays that queue
//! against a `RemoteStore` whenever the device is online, translating each
//! payload from the local camelCase layout into the remote snake_case one.
//! `ConnectivityMonitor` starts a pass automatically after reconnecting.

mod connectivity;
mod engine;
mod keys;
mod probe;
mod remote;
#[cfg(test)]
mod testing;

pub use connectivity::{Connectivity, ConnectivityMonitor, MonitorSubscription, DEFAULT_SETTLE_DELAY};
pub use engine::{SyncEngine, SyncReport, SyncStatus};
pub use keys::{camel_to_snake, to_remote_keys, to_remote_payload};
pub use probe::{ConnectivityProbe, DEFAULT_PROBE_INTERVAL};
pub use remote::{normalize_rest_url, PostgrestRemoteStore, RemoteError, RemoteResult, RemoteStore};
