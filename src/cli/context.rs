//! Command execution context
//!
//! Provides a unified context for command execution: resolved settings plus an
//! authenticated, cache-wrapped API client.

use std::sync::Arc;

use crate::cache::{CachedClient, ResponseCache};
use crate::cli::args::GlobalOptions;
use crate::client::GoogleClient;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::output::OutputOptions;

/// Context for command execution containing settings and the API client.
pub struct CommandContext {
    /// Flags, environment and config file merged
    pub settings: Settings,
    /// Authenticated API client with caching (Arc-wrapped for parallel request support)
    pub client: Arc<CachedClient<GoogleClient>>,
}

impl CommandContext {
    /// Resolve settings and build the client.
    ///
    /// # Errors
    /// Returns error if the config is invalid or the token file cannot be read.
    /// Nothing has been sent to the API at that point.
    pub async fn new(opts: &GlobalOptions) -> Result<Self> {
        let settings = Settings::resolve(opts)?;
        let raw_client = GoogleClient::from_settings(&settings)?;
        let cache = ResponseCache::from_settings(&settings.cache);
        let client = Arc::new(CachedClient::new(raw_client, cache));

        Ok(Self { settings, client })
    }

    pub fn output(&self) -> &OutputOptions {
        &self.settings.output
    }
}

/// Refuse a destructive operation unless `--force` or `--yes` was given.
pub fn require_confirmation(force: bool, assume_yes: bool, action: &str) -> Result<()> {
    if force || assume_yes {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{} requires confirmation; re-run with --force or --yes",
            action
        )))
    }
}
