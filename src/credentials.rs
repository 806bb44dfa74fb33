//! OAuth2 credential files
//!
//! The token and client secret live in local JSON files. Paths are checked
//! against traversal and must sit under the home directory or a temp
//! directory; loose file permissions are reported but not fatal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::error::CredentialError;

type Result<T> = std::result::Result<T, CredentialError>;

/// Google's token endpoint, used when the client secret does not name one
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Reject empty paths, `..` components, and paths outside home or temp dirs.
pub fn validate_credential_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(CredentialError::EmptyPath);
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(CredentialError::PathTraversal(path.to_path_buf()));
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut allowed: Vec<PathBuf> = vec![PathBuf::from("/tmp"), std::env::temp_dir()];
    if let Some(home) = dirs::home_dir() {
        allowed.push(home);
    }

    if allowed.iter().any(|dir| absolute.starts_with(dir)) {
        Ok(())
    } else {
        Err(CredentialError::OutsideAllowedDirs(absolute))
    }
}

/// Outcome of a permission check on a credential file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionCheck {
    /// Readable by the owner only
    Secure,
    /// Group-readable, but not world-readable
    GroupReadable(u32),
    /// Readable by everyone
    WorldReadable(u32),
    Missing,
}

impl PermissionCheck {
    pub fn is_secure(&self) -> bool {
        matches!(self, PermissionCheck::Secure)
    }
}

/// Warn when a credential file can be read by group or others.
pub fn check_file_permissions(path: &Path) -> PermissionCheck {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(_) => return PermissionCheck::Missing,
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = metadata.permissions().mode() & 0o777;
        if mode & 0o004 != 0 {
            log::warn!(
                "CRITICAL: {} is world-readable (mode {:o}); run `chmod 600 {}`",
                path.display(),
                mode,
                path.display()
            );
            return PermissionCheck::WorldReadable(mode);
        }
        if mode & 0o040 != 0 {
            log::warn!(
                "{} is readable by group (mode {:o}); consider `chmod 600 {}`",
                path.display(),
                mode,
                path.display()
            );
            return PermissionCheck::GroupReadable(mode);
        }
    }

    #[cfg(not(unix))]
    let _ = metadata;

    PermissionCheck::Secure
}

/// OAuth2 token as saved on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl OAuthToken {
    /// Check if the token is expired or will expire soon (within 1 minute).
    /// A token without an expiry never expires.
    pub fn is_expired(&self) -> bool {
        match self.expiry {
            None => false,
            Some(expiry) => expiry - chrono::Duration::minutes(1) < Utc::now(),
        }
    }
}

/// Reads and writes the OAuth2 token file
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved token
    pub fn load(&self) -> Result<OAuthToken> {
        validate_credential_path(&self.path)?;
        if !self.path.exists() {
            return Err(CredentialError::MissingToken(self.path.clone()));
        }
        check_file_permissions(&self.path);

        let contents = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&contents).map_err(|e| CredentialError::Malformed {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Save a token with owner-only permissions
    pub fn save(&self, token: &OAuthToken) -> Result<()> {
        validate_credential_path(&self.path)?;
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700))?;
            }
        }

        let contents = serde_json::to_string(token).map_err(|e| CredentialError::Malformed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        std::fs::write(&self.path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        log::debug!("Saved OAuth2 token to {}", self.path.display());
        Ok(())
    }
}

/// OAuth2 client identity from a Google client secret file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The downloaded file wraps the secret in `installed` or `web`
#[derive(Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    /// Load a client secret file
    pub fn load(path: &Path) -> Result<Self> {
        validate_credential_path(path)?;
        if !path.exists() {
            return Err(CredentialError::MissingClientSecret(path.to_path_buf()));
        }
        check_file_permissions(path);

        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents).map_err(|reason| CredentialError::Malformed {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn parse(contents: &str) -> std::result::Result<Self, String> {
        let file: ClientSecretFile = serde_json::from_str(contents).map_err(|e| e.to_string())?;
        file.installed
            .or(file.web)
            .ok_or_else(|| "expected an \"installed\" or \"web\" section".to_string())
    }
}
