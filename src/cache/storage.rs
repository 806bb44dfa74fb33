//! File-per-key cache storage
//!
//! Each entry is a pretty-printed JSON file `<cache_dir>/<key>` holding
//! `{timestamp, ttl, data}` with `ttl` in seconds. The directory listing is the index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::CacheSettings;
use crate::error::CacheError;

type Result<T> = std::result::Result<T, CacheError>;

/// Resource type that selects every entry in [`ResponseCache::clear`]
pub const ALL_RESOURCES: &str = "all";

/// One cached response as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "ttl")]
    pub ttl_seconds: u64,
    pub data: Value,
}

/// Result of a cache lookup. None of these are errors.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(Value),
    Miss,
    Expired,
    Disabled,
}

/// Aggregate view of the cache directory
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entry_count: usize,
    pub total_size: u64,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
    pub ttl: Duration,
    pub enabled: bool,
    pub location: PathBuf,
}

/// Directory-backed response cache
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    enabled: bool,
    default_ttl: Duration,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>, enabled: bool, default_ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            enabled,
            default_ttl,
        }
    }

    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::new(&settings.directory, settings.enabled, settings.ttl)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Look up an entry.
    ///
    /// A nonzero `ttl` replaces the TTL stored with the entry, so a changed
    /// setting applies to entries written earlier. Missing or unparseable
    /// files are misses; only I/O failures such as permission errors are
    /// returned as errors.
    pub fn read(&self, key: &str, ttl: Duration) -> Result<CacheLookup> {
        if !self.enabled {
            return Ok(CacheLookup::Disabled);
        }

        let path = self.dir.join(key);
        let contents = match std::fs::read(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("Cache miss: {}", key);
                return Ok(CacheLookup::Miss);
            }
            Err(e) => return Err(e.into()),
        };

        let entry: CacheEntry = match serde_json::from_slice(&contents) {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Unreadable cache entry {}: {}", key, e);
                return Ok(CacheLookup::Miss);
            }
        };

        let effective_ttl = if ttl.is_zero() {
            Duration::from_secs(entry.ttl_seconds)
        } else {
            ttl
        };
        let age = (Utc::now() - entry.timestamp)
            .to_std()
            .unwrap_or(Duration::ZERO);

        if age > effective_ttl {
            log::debug!("Cache expired: {} (age {:?}, ttl {:?})", key, age, effective_ttl);
            return Ok(CacheLookup::Expired);
        }

        log::debug!("Cache hit: {}", key);
        Ok(CacheLookup::Hit(entry.data))
    }

    /// Store an entry, replacing any previous one. No-op when disabled.
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, data: &T, ttl: Duration) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        self.ensure_dir()?;

        let entry = CacheEntry {
            timestamp: Utc::now(),
            ttl_seconds: ttl.as_secs(),
            data: serde_json::to_value(data)?,
        };

        // Write to a sibling temp file (created 0600) and rename into place
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut tmp, &entry)?;
        tmp.flush()?;
        set_owner_only(tmp.path(), 0o600)?;
        tmp.persist(self.dir.join(key)).map_err(|e| e.error)?;

        log::debug!("Cache write: {} (ttl {:?})", key, ttl);
        Ok(())
    }

    /// Remove entries of one resource type, or all of them for `"all"` or `""`.
    ///
    /// Best effort: a file that cannot be removed is logged and skipped.
    pub fn clear(&self, resource_type: &str) -> Result<usize> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let prefix = match resource_type {
            "" | ALL_RESOURCES => None,
            other => Some(format!("{}-", other)),
        };

        let mut cleared = 0;
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable cache entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }

            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(prefix) = &prefix
                && !name.starts_with(prefix.as_str())
            {
                continue;
            }

            match std::fs::remove_file(entry.path()) {
                Ok(()) => cleared += 1,
                Err(e) => log::warn!("Failed to remove cache file {}: {}", name, e),
            }
        }

        log::info!("Cleared {} cache entries", cleared);
        Ok(cleared)
    }

    /// Scan the directory for entry count, size and age range.
    pub fn stats(&self) -> Result<CacheStats> {
        let mut stats = CacheStats {
            entry_count: 0,
            total_size: 0,
            oldest: None,
            newest: None,
            ttl: self.default_ttl,
            enabled: self.enabled,
            location: self.dir.clone(),
        };

        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(stats),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            // Entries can vanish mid-scan under a concurrent clear or write
            let metadata = match entry.and_then(|entry| std::fs::metadata(entry.path())) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    log::warn!("Skipping unreadable cache entry: {}", e);
                    continue;
                }
            };
            if metadata.is_dir() {
                continue;
            }

            stats.entry_count += 1;
            stats.total_size += metadata.len();

            if let Ok(modified) = metadata.modified() {
                let modified: DateTime<Utc> = modified.into();
                if stats.oldest.is_none_or(|oldest| modified < oldest) {
                    stats.oldest = Some(modified);
                }
                if stats.newest.is_none_or(|newest| modified > newest) {
                    stats.newest = Some(modified);
                }
            }
        }

        Ok(stats)
    }

    fn ensure_dir(&self) -> Result<()> {
        if self.dir.is_dir() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.dir).map_err(|source| CacheError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        set_owner_only(&self.dir, 0o700)
    }
}

#[cfg(unix)]
fn set_owner_only(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
