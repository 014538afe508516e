//! Shared sync indicator state.

use crate::sync::SyncStatus;

/// Sync indicator shown by front-ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    Offline,
    Syncing,
    Pending,
    Synced,
}

impl SyncState {
    /// A running pass wins over offline, since it was started while online.
    pub const fn from_status(online: bool, status: &SyncStatus) -> Self {
        if status.is_syncing {
            Self::Syncing
        } else if !online {
            Self::Offline
        } else if status.pending_count > 0 {
            Self::Pending
        } else {
            Self::Synced
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Syncing => "syncing",
            Self::Pending => "pending",
            Self::Synced => "synced",
        }
    }
}
