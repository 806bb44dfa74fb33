//! Directory API: user accounts and aliases

use async_trait::async_trait;
use serde_json::Value;

use crate::client::query::UserQuery;
use crate::error::Result;

/// User account operations
#[async_trait]
pub trait UsersApi: Send + Sync {
    /// List users for the customer, following every page
    async fn list_users(&self, query: &UserQuery) -> Result<Vec<Value>>;

    /// Get one user by email or ID (full projection)
    async fn get_user(&self, user_key: &str) -> Result<Value>;

    async fn insert_user(&self, user: &Value) -> Result<Value>;

    /// Patch a user; fields absent from `patch` are left alone
    async fn update_user(&self, user_key: &str, patch: &Value) -> Result<Value>;

    /// Sign the user out of all web and device sessions
    async fn sign_out_user(&self, user_key: &str) -> Result<()>;

    // ========================================================================
    // Aliases
    // ========================================================================

    async fn list_aliases(&self, user_key: &str) -> Result<Vec<Value>>;

    async fn insert_alias(&self, user_key: &str, alias: &str) -> Result<Value>;

    async fn delete_alias(&self, user_key: &str, alias: &str) -> Result<()>;
}
