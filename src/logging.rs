//! Logger initialisation
//!
//! Everything goes to stderr so stdout stays clean for command output.
//! `GAC_LOG` takes env_logger filter syntax and overrides the flags.

use std::io::Write;

use chrono::{SecondsFormat, Utc};
use env_logger::{Builder, Env, Target};
use log::LevelFilter;
use serde_json::json;

use crate::cli::LogLevel;

/// Environment variable holding an env_logger filter
pub const LOG_ENV: &str = "GAC_LOG";

/// Effective level: `-v` means debug, otherwise `--log-level`
pub fn level_for(verbose: bool, level: LogLevel) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        level.as_filter()
    }
}

/// Install the global logger. Call once, before any command runs.
pub fn init(verbose: bool, level: LogLevel, json_log: bool) {
    let default = level_for(verbose, level).to_string().to_lowercase();
    let mut builder = Builder::from_env(Env::new().filter_or(LOG_ENV, default));
    builder.target(Target::Stderr);

    if json_log {
        builder.format(|buf, record| {
            let line = json!({
                "time": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                "level": record.level().to_string(),
                "target": record.target(),
                "message": record.args().to_string(),
            });
            writeln!(buf, "{}", line)
        });
    }

    // Ignore a logger installed earlier
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_wins_over_level() {
        assert_eq!(level_for(true, LogLevel::Error), LevelFilter::Debug);
        assert_eq!(level_for(false, LogLevel::Info), LevelFilter::Info);
        assert_eq!(level_for(false, LogLevel::default()), LevelFilter::Warn);
    }
}
