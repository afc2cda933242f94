//! Key-value persistence for ledger state.
//!
//! The ledger only needs an asynchronous string-keyed get/set store. Two
//! backends are provided: an in-process map and a directory of JSON files.

pub mod envelope;
pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

/// Storage keys, one per persisted ledger slice.
pub mod keys {
    pub const QUICK_ACTIONS: &str = "quickActions";
    pub const ACTIVITY_GROUPS: &str = "activityGroups";
    pub const RECENT_ACTIVITIES: &str = "recentActivities";
    pub const TOTAL_CARBON_SAVED: &str = "totalCarbonSaved";
    pub const SHOW_TOOLTIPS: &str = "showTooltips";

    /// Every slice key, in load/save order.
    pub const ALL: [&str; 5] = [
        QUICK_ACTIONS,
        ACTIVITY_GROUPS,
        RECENT_ACTIVITIES,
        TOTAL_CARBON_SAVED,
        SHOW_TOOLTIPS,
    ];
}

/// Asynchronous string-keyed store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` means the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
}

/// Storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed stored value: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Unsupported stored version {found} (newest known is {supported})")]
    UnsupportedVersion { found: u64, supported: u64 },
}
