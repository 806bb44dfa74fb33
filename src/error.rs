//! Error types for the gac CLI

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for gac operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An operation failed; carries the action that was attempted and
    /// hints printed below the error message.
    #[error("{action}: {source}")]
    Failed {
        action: String,
        #[source]
        source: Box<Error>,
        hints: &'static [&'static str],
    },

    #[error("Operation failed: {0}")]
    Other(String),
}

impl Error {
    /// Hints to print under "Common reasons for failure", if any.
    pub fn hints(&self) -> &'static [&'static str] {
        match self {
            Error::Failed { hints, .. } => hints,
            _ => &[],
        }
    }
}

/// Attach operation context and failure hints to a result.
pub trait ResultExt<T> {
    fn context(self, action: impl Into<String>) -> Result<T>;

    fn with_hints(self, action: impl Into<String>, hints: &'static [&'static str]) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, action: impl Into<String>) -> Result<T> {
        self.with_hints(action, &[])
    }

    fn with_hints(self, action: impl Into<String>, hints: &'static [&'static str]) -> Result<T> {
        self.map_err(|err| Error::Failed {
            action: action.into(),
            source: Box::new(err.into()),
            hints,
        })
    }
}

/// API-related errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed. Check the OAuth2 token file or refresh it.")]
    Unauthorized,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("Domain not configured. Set `domain` in the config file or pass --domain.")]
    MissingDomain,

    #[error("Could not determine the home directory")]
    NoHome,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Credential file errors
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Credential path is empty")]
    EmptyPath,

    #[error("Credential path must not contain '..': {}", .0.display())]
    PathTraversal(PathBuf),

    #[error("Credential path must be under the home directory or a temp directory: {}", .0.display())]
    OutsideAllowedDirs(PathBuf),

    #[error("No OAuth2 token at {}. Authorize with your client secret and save the token there.", .0.display())]
    MissingToken(PathBuf),

    #[error("Client secret file not found: {}", .0.display())]
    MissingClientSecret(PathBuf),

    #[error("Malformed credential file {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("Token refresh failed: {0}")]
    Refresh(String),

    #[error("Credential file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Response cache errors. Misses and expiry are not errors.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Could not determine the user cache directory")]
    NoHome,

    #[error("Failed to create cache directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize cache entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Output formatting errors
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Unsupported output format '{0}'. Use one of: json, yaml, csv, table, plain")]
    UnsupportedFormat(String),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML encoding failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Output write failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_unauthorized_message() {
        let err = ApiError::Unauthorized;
        assert!(err.to_string().contains("token"));
    }

    #[test]
    fn test_api_error_forbidden_message() {
        let err = ApiError::Forbidden("Not Authorized to access this resource/api".to_string());
        assert!(err.to_string().contains("Not Authorized"));
    }

    #[test]
    fn test_api_error_rate_limit() {
        let err = ApiError::RateLimit(Duration::from_secs(30));
        let msg = err.to_string();
        assert!(msg.contains("Rate limit"));
        assert!(msg.contains("30"));
    }

    #[test]
    fn test_api_error_bad_request() {
        let err = ApiError::BadRequest("Invalid Input: primary_user_email".to_string());
        assert!(err.to_string().contains("primary_user_email"));
    }

    #[test]
    fn test_config_error_not_found_includes_path() {
        let err = ConfigError::NotFound(PathBuf::from("/tmp/missing.yaml"));
        assert!(err.to_string().contains("/tmp/missing.yaml"));
    }

    #[test]
    fn test_config_error_missing_domain() {
        let err = ConfigError::MissingDomain;
        assert!(err.to_string().contains("--domain"));
    }

    #[test]
    fn test_credential_error_traversal() {
        let err = CredentialError::PathTraversal(PathBuf::from("/home/u/../etc/token"));
        assert!(err.to_string().contains(".."));
    }

    #[test]
    fn test_format_error_unsupported() {
        let err = FormatError::UnsupportedFormat("xml".to_string());
        let msg = err.to_string();
        assert!(msg.contains("xml"));
        assert!(msg.contains("plain"));
    }

    #[test]
    fn test_context_wraps_source_and_keeps_hints() {
        let result: std::result::Result<(), ApiError> =
            Err(ApiError::NotFound("user bob@example.com".to_string()));
        let err = result
            .with_hints("Unable to update bob@example.com", &["the user does not exist"])
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.starts_with("Unable to update bob@example.com: "));
        assert!(msg.contains("Resource not found"));
        assert_eq!(err.hints(), &["the user does not exist"]);
    }

    #[test]
    fn test_plain_errors_have_no_hints() {
        let err = Error::Validation("bad email".to_string());
        assert!(err.hints().is_empty());
    }
}
