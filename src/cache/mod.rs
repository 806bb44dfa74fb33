//! Local cache for API responses
//!
//! Idempotent list/get calls are stored one file per request shape under the
//! cache directory and served until their TTL runs out. Staleness is purely
//! time-based; mutations made through gac clear the affected resource type.

pub mod client;
pub mod key;
pub mod storage;

/// Cache-key namespaces, one per kind of API result
pub struct ResourceType;

impl ResourceType {
    pub const USERS: &'static str = "users";
    pub const GROUPS: &'static str = "groups";
    pub const ORG_UNITS: &'static str = "orgunits";
    pub const RESOURCES: &'static str = "resources";

    /// Names accepted by `cache clear`
    pub const ALL: [&'static str; 4] = [Self::USERS, Self::GROUPS, Self::ORG_UNITS, Self::RESOURCES];
}

// Re-export main types
pub use client::CachedClient;
pub use key::{build_key, filters};
pub use storage::{ALL_RESOURCES, CacheLookup, CacheStats, ResponseCache};
