//! Directory API: organizational units

use async_trait::async_trait;
use serde_json::Value;

use crate::client::query::OrgUnitQuery;
use crate::error::Result;

/// Org unit operations. Paths are given with or without the leading `/`.
#[async_trait]
pub trait OrgUnitsApi: Send + Sync {
    async fn list_org_units(&self, query: &OrgUnitQuery) -> Result<Vec<Value>>;

    async fn get_org_unit(&self, path: &str) -> Result<Value>;

    async fn insert_org_unit(&self, org_unit: &Value) -> Result<Value>;

    async fn update_org_unit(&self, path: &str, patch: &Value) -> Result<Value>;

    async fn delete_org_unit(&self, path: &str) -> Result<()>;
}
