//! Global CLI options shared across all commands
//!
//! Handlers never see `Cli` directly; this struct carries the global flags
//! into [`Settings::resolve`](crate::config::Settings::resolve), which layers
//! them over the environment and the config file.

use std::path::PathBuf;

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// CLI flag > `GAC_*` environment variable > `GOOGLE_ADMIN_*` environment
/// variable > config file > default. Clap folds the `GAC_*` layer into these
/// fields; the rest is resolved in `Settings`.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format override; `None` defers to the config file
    pub format: Option<OutputFormat>,

    /// Suppress headers and informational messages
    pub quiet: bool,

    /// Custom config file path (defaults to ~/.google-admin.yaml)
    pub config: Option<PathBuf>,

    /// OAuth2 client secret JSON file
    pub client_secret: Option<String>,

    /// OAuth2 token cache file
    pub token_file: Option<String>,

    /// Workspace domain override
    pub domain: Option<String>,

    /// Bypass the response cache
    pub no_cache: bool,

    /// Cache TTL override, e.g. `30m`
    pub cache_ttl: Option<String>,

    /// Cache directory override
    pub cache_dir: Option<String>,

    /// Skip confirmation for destructive operations
    pub assume_yes: bool,

    /// Custom API host for development/testing
    pub api_host: Option<String>,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            quiet: cli.quiet,
            config: cli.config.clone(),
            client_secret: cli.client_secret.clone(),
            token_file: cli.cache_file.clone(),
            domain: cli.domain.clone(),
            no_cache: cli.no_cache,
            cache_ttl: cli.cache_ttl.clone(),
            cache_dir: cli.cache_dir.clone(),
            assume_yes: cli.yes,
            api_host: cli.api_host.clone(),
        }
    }
}
