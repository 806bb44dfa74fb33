//! Directory API: buildings and calendar resources

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Calendar resource operations
#[async_trait]
pub trait ResourcesApi: Send + Sync {
    async fn list_buildings(&self) -> Result<Vec<Value>>;

    async fn list_calendar_resources(&self) -> Result<Vec<Value>>;

    async fn insert_calendar_resource(&self, resource: &Value) -> Result<Value>;

    async fn update_calendar_resource(&self, resource_id: &str, patch: &Value) -> Result<Value>;

    async fn delete_calendar_resource(&self, resource_id: &str) -> Result<()>;
}
