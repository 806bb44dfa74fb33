//! Reports API: audit activities

use async_trait::async_trait;
use serde_json::Value;

use crate::client::query::ActivityQuery;
use crate::error::Result;

#[async_trait]
pub trait ReportsApi: Send + Sync {
    /// List activities, following pages until exhausted or `max_results` is reached
    async fn list_activities(&self, query: &ActivityQuery) -> Result<Vec<Value>>;
}
