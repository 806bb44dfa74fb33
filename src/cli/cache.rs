//! Cache management commands

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};

use crate::cache::{ALL_RESOURCES, CacheStats, ResourceType, ResponseCache};
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::config::{Settings, format_duration};
use crate::error::{Error, Result};
use crate::models::CacheStatusRow;
use crate::output::formatters::{format_bytes, format_time_ago};
use crate::output;

fn open(opts: &GlobalOptions) -> Result<(Settings, ResponseCache)> {
    let settings = Settings::resolve(opts)?;
    let cache = ResponseCache::from_settings(&settings.cache);
    Ok((settings, cache))
}

/// Show cache status/statistics
pub fn status(opts: &GlobalOptions) -> Result<()> {
    let (settings, cache) = open(opts)?;
    let stats = cache.stats()?;

    match settings.output.format {
        OutputFormat::Plain => {
            if !settings.output.quiet {
                print!("{}", render_status(&stats, Utc::now()));
            }
            Ok(())
        }
        _ => output::print_one(
            &CacheStatusRow::from(&stats),
            CacheStatusRow::HEADERS,
            &settings.output,
        ),
    }
}

/// Human-readable status report
pub fn render_status(stats: &CacheStats, now: DateTime<Utc>) -> String {
    let stamp = |t: DateTime<Utc>| {
        format!(
            "{} ({})",
            t.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            format_time_ago(t, now)
        )
    };

    let mut out = String::new();
    let _ = writeln!(out, "Cache Status");
    let _ = writeln!(out, "────────────────────────────────────────");
    let _ = writeln!(
        out,
        "Enabled:        {}",
        if stats.enabled { "yes" } else { "no" }
    );
    let _ = writeln!(out, "Location:       {}", stats.location.display());
    let _ = writeln!(out, "Entries:        {}", stats.entry_count);
    let _ = writeln!(out, "Total size:     {}", format_bytes(stats.total_size));
    let _ = writeln!(out, "Default TTL:    {}", format_duration(stats.ttl));
    if let Some(oldest) = stats.oldest {
        let _ = writeln!(out, "Oldest entry:   {}", stamp(oldest));
    }
    if let Some(newest) = stats.newest {
        let _ = writeln!(out, "Newest entry:   {}", stamp(newest));
    }
    out
}

/// Resource type to clear; `--all` or no type clears everything
pub fn clear_target(resource_type: Option<&str>, all: bool) -> Result<&str> {
    match resource_type {
        _ if all => Ok(ALL_RESOURCES),
        None => Ok(ALL_RESOURCES),
        Some(kind) if kind == ALL_RESOURCES || ResourceType::ALL.contains(&kind) => Ok(kind),
        Some(kind) => Err(Error::Validation(format!(
            "unknown resource type: {} (valid: {}, {})",
            kind,
            ResourceType::ALL.join(", "),
            ALL_RESOURCES
        ))),
    }
}

/// Clear cache entries
pub fn clear(opts: &GlobalOptions, resource_type: Option<&str>, all: bool) -> Result<()> {
    let target = clear_target(resource_type, all)?;
    let (settings, cache) = open(opts)?;
    let cleared = cache.clear(target)?;

    match settings.output.format {
        OutputFormat::Json | OutputFormat::Yaml => output::print_one(
            &serde_json::json!({
                "resource_type": target,
                "entries_removed": cleared,
                "success": true,
            }),
            &[],
            &settings.output,
        ),
        _ => {
            let text = match (cleared, target) {
                (0, _) => "Cache was already empty".to_string(),
                (n, ALL_RESOURCES) => format!("Cleared {} cache entries", n),
                (n, kind) => format!("Cleared {} {} cache entries", n, kind),
            };
            output::message(&settings.output, text);
            Ok(())
        }
    }
}

/// Show cache path
pub fn path(opts: &GlobalOptions) -> Result<()> {
    let (_, cache) = open(opts)?;
    println!("{}", cache.dir().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_clear_target() {
        assert_eq!(clear_target(None, false).unwrap(), "all");
        assert_eq!(clear_target(Some("users"), true).unwrap(), "all");
        assert_eq!(clear_target(Some("orgunits"), false).unwrap(), "orgunits");
        assert!(clear_target(Some("repos"), false).is_err());
    }

    #[test]
    fn test_render_status() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let stats = CacheStats {
            entry_count: 3,
            total_size: 1536,
            oldest: Some(now - ChronoDuration::minutes(5)),
            newest: None,
            ttl: Duration::from_secs(15 * 60),
            enabled: true,
            location: PathBuf::from("/tmp/gac-cache"),
        };

        let report = render_status(&stats, now);
        assert!(report.starts_with("Cache Status\n"));
        assert!(report.contains("Location:       /tmp/gac-cache\n"));
        assert!(report.contains("Entries:        3\n"));
        assert!(report.contains("Total size:     1.5 KB\n"));
        assert!(report.contains("Default TTL:    15m"));
        assert!(report.contains("(5 minutes ago)"));
        assert!(!report.contains("Newest entry"));
    }
}
