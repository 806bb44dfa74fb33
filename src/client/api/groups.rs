//! Directory API groups and members, plus the Groups Settings API

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Group, membership and group-settings operations
#[async_trait]
pub trait GroupsApi: Send + Sync {
    /// List every group in the domain
    async fn list_groups(&self, domain: &str) -> Result<Vec<Value>>;

    /// List the groups a user belongs to
    async fn list_user_groups(&self, user_key: &str) -> Result<Vec<Value>>;

    async fn get_group(&self, group_key: &str) -> Result<Value>;

    async fn list_members(&self, group_key: &str) -> Result<Vec<Value>>;

    async fn insert_member(&self, group_key: &str, member: &Value) -> Result<Value>;

    async fn delete_member(&self, group_key: &str, member_key: &str) -> Result<()>;

    // ========================================================================
    // Group settings
    // ========================================================================

    async fn get_group_settings(&self, group_email: &str) -> Result<Value>;

    async fn update_group_settings(&self, group_email: &str, patch: &Value) -> Result<Value>;
}
