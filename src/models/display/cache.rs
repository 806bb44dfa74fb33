//! Cache status display model

use serde::Serialize;

use crate::cache::CacheStats;
use crate::config::format_duration;
use crate::output::Record;
use crate::output::formatters::format_bytes;

/// Machine-readable `cache status`
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatusRow {
    pub enabled: bool,
    pub location: String,
    pub total_size: String,
    pub total_size_bytes: u64,
    pub entry_count: usize,
    pub oldest_entry: Option<String>,
    pub newest_entry: Option<String>,
    pub default_ttl: String,
}

impl CacheStatusRow {
    pub const HEADERS: &'static [&'static str] = &[
        "Enabled",
        "Location",
        "Total_Size",
        "Entry_Count",
        "Oldest_Entry",
        "Newest_Entry",
        "Default_TTL",
    ];
}

impl Record for CacheStatusRow {}

impl From<&CacheStats> for CacheStatusRow {
    fn from(stats: &CacheStats) -> Self {
        Self {
            enabled: stats.enabled,
            location: stats.location.display().to_string(),
            total_size: format_bytes(stats.total_size),
            total_size_bytes: stats.total_size,
            entry_count: stats.entry_count,
            oldest_entry: stats.oldest.map(|t| t.to_rfc3339()),
            newest_entry: stats.newest.map(|t| t.to_rfc3339()),
            default_ttl: format_duration(stats.ttl),
        }
    }
}
