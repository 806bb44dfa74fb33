//! Runtime settings resolved from flags, environment and the config file

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::{Config, DEFAULT_FORMER_EMPLOYEES_OU, expand_home, parse_duration};
use crate::cli::{GlobalOptions, OutputFormat};
use crate::error::{ConfigError, Result};
use crate::output::OutputOptions;

/// Default client secret location
const DEFAULT_CLIENT_SECRET: &str = "~/.credentials/client_secret.json";

/// Default OAuth2 token location
const DEFAULT_TOKEN_FILE: &str = "~/.credentials/gac.json";

/// Default time-to-live for cached responses
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Directory name under the user cache dir
const CACHE_DIR_NAME: &str = "gac";

/// Fully resolved settings for one invocation.
///
/// Precedence: flag > `GAC_*` env (handled by clap) > legacy `GOOGLE_ADMIN_*`
/// env > config file > default.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub domain: Option<String>,
    pub client_secret: PathBuf,
    pub token_file: PathBuf,
    pub cache: CacheSettings,
    pub output: OutputOptions,
    pub audit: AuditSettings,
    pub api_host: Option<String>,
    pub assume_yes: bool,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl: Duration,
    pub directory: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AuditSettings {
    pub staff_ous: Vec<String>,
    pub former_employees_ou: String,
}

impl Settings {
    /// Load the config file named by the options and resolve everything.
    pub fn resolve(opts: &GlobalOptions) -> Result<Self> {
        let (config, config_path) = Config::load_at(opts.config.as_deref())?;
        Self::from_parts(config, config_path, opts, |name| std::env::var(name).ok())
    }

    /// Resolve settings from an already-loaded config.
    pub fn from_parts(
        config: Config,
        config_path: PathBuf,
        opts: &GlobalOptions,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let domain = opts
            .domain
            .clone()
            .or_else(|| env("GOOGLE_ADMIN_DOMAIN"))
            .or(config.domain)
            .filter(|d| !d.trim().is_empty());

        let client_secret = opts
            .client_secret
            .clone()
            .or_else(|| env("GOOGLE_ADMIN_CLIENT_SECRET"))
            .or(config.client_secret)
            .unwrap_or_else(|| DEFAULT_CLIENT_SECRET.to_string());

        let token_file = opts
            .token_file
            .clone()
            .or_else(|| env("GOOGLE_ADMIN_CACHE_FILE"))
            .or(config.cache_file)
            .unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string());

        let format = match opts.format {
            Some(format) => format,
            None => match config.format.as_deref() {
                Some(name) => OutputFormat::from_str(name)
                    .map_err(|e| ConfigError::Invalid(e.to_string()))?,
                None => OutputFormat::default(),
            },
        };

        let ttl = match opts.cache_ttl.as_deref().or(config.cache.ttl.as_deref()) {
            Some(raw) => parse_duration(raw)?,
            None => DEFAULT_CACHE_TTL,
        };

        let directory = match opts.cache_dir.as_deref().or(config.cache.directory.as_deref()) {
            Some(dir) => expand_home(dir)?,
            None => dirs::home_dir()
                .ok_or(ConfigError::NoHome)?
                .join(".cache")
                .join(CACHE_DIR_NAME),
        };

        let staff_ous = if config.audit.staff_ous.is_empty() {
            vec!["/".to_string()]
        } else {
            config.audit.staff_ous
        };

        Ok(Self {
            config_path,
            domain,
            client_secret: expand_home(&client_secret)?,
            token_file: expand_home(&token_file)?,
            cache: CacheSettings {
                enabled: !opts.no_cache && config.cache.enabled.unwrap_or(true),
                ttl,
                directory,
            },
            output: OutputOptions {
                format,
                quiet: opts.quiet,
            },
            audit: AuditSettings {
                staff_ous,
                former_employees_ou: config
                    .audit
                    .former_employees_ou
                    .unwrap_or_else(|| DEFAULT_FORMER_EMPLOYEES_OU.to_string()),
            },
            api_host: opts.api_host.clone(),
            assume_yes: opts.assume_yes,
        })
    }

    /// Get the domain, returning an error if not set.
    pub fn require_domain(&self) -> Result<&str> {
        self.domain
            .as_deref()
            .ok_or_else(|| ConfigError::MissingDomain.into())
    }

    /// Qualify a bare group or user name with the configured domain.
    pub fn qualify(&self, name: &str) -> Result<String> {
        if name.contains('@') {
            Ok(name.to_string())
        } else {
            Ok(format!("{}@{}", name, self.require_domain()?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn resolve(config: Config, opts: &GlobalOptions) -> Result<Settings> {
        Settings::from_parts(config, PathBuf::from("/tmp/gac.yaml"), opts, no_env)
    }

    #[test]
    fn test_defaults() {
        let settings = resolve(Config::default(), &GlobalOptions::default()).unwrap();

        assert!(settings.domain.is_none());
        assert!(settings.cache.enabled);
        assert_eq!(settings.cache.ttl, DEFAULT_CACHE_TTL);
        assert_eq!(
            settings.cache.directory,
            dirs::home_dir().unwrap().join(".cache").join("gac")
        );
        assert!(settings.client_secret.ends_with(".credentials/client_secret.json"));
        assert!(settings.token_file.ends_with(".credentials/gac.json"));
        assert_eq!(settings.output.format, OutputFormat::Plain);
        assert_eq!(settings.audit.staff_ous, vec!["/"]);
        assert_eq!(settings.audit.former_employees_ou, "/Former employees");
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            domain: Some("config.example.com".to_string()),
            format: Some("yaml".to_string()),
            cache: CacheConfig {
                enabled: Some(true),
                ttl: Some("1h".to_string()),
                directory: Some("/tmp/from-config".to_string()),
            },
            ..Config::default()
        };
        let opts = GlobalOptions {
            domain: Some("flag.example.com".to_string()),
            format: Some(OutputFormat::Csv),
            cache_ttl: Some("30s".to_string()),
            cache_dir: Some("/tmp/from-flag".to_string()),
            no_cache: true,
            ..GlobalOptions::default()
        };

        let settings = resolve(config, &opts).unwrap();
        assert_eq!(settings.domain.as_deref(), Some("flag.example.com"));
        assert_eq!(settings.output.format, OutputFormat::Csv);
        assert_eq!(settings.cache.ttl, Duration::from_secs(30));
        assert_eq!(settings.cache.directory, PathBuf::from("/tmp/from-flag"));
        assert!(!settings.cache.enabled);
    }

    #[test]
    fn test_legacy_env_sits_between_flag_and_file() {
        let config = Config {
            domain: Some("file.example.com".to_string()),
            ..Config::default()
        };
        let env = |name: &str| (name == "GOOGLE_ADMIN_DOMAIN").then(|| "env.example.com".to_string());

        let settings = Settings::from_parts(
            config,
            PathBuf::from("/tmp/gac.yaml"),
            &GlobalOptions::default(),
            env,
        )
        .unwrap();
        assert_eq!(settings.domain.as_deref(), Some("env.example.com"));
    }

    #[test]
    fn test_invalid_config_format_is_config_error() {
        let config = Config {
            format: Some("xml".to_string()),
            ..Config::default()
        };
        let err = resolve(config, &GlobalOptions::default()).unwrap_err();
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn test_invalid_ttl_is_config_error() {
        let opts = GlobalOptions {
            cache_ttl: Some("soon".to_string()),
            ..GlobalOptions::default()
        };
        assert!(resolve(Config::default(), &opts).is_err());
    }

    #[test]
    fn test_qualify_and_require_domain() {
        let opts = GlobalOptions {
            domain: Some("example.com".to_string()),
            ..GlobalOptions::default()
        };
        let settings = resolve(Config::default(), &opts).unwrap();
        assert_eq!(settings.qualify("eng").unwrap(), "eng@example.com");
        assert_eq!(settings.qualify("ops@other.org").unwrap(), "ops@other.org");

        let bare = resolve(Config::default(), &GlobalOptions::default()).unwrap();
        assert!(bare.require_domain().is_err());
        assert!(bare.qualify("eng").is_err());
    }
}
