//! Calendar API: events

use async_trait::async_trait;
use serde_json::Value;

use crate::client::query::EventQuery;
use crate::error::Result;

#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// List upcoming events, expanded into single instances
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Value>>;

    async fn insert_event(&self, calendar_id: &str, event: &Value) -> Result<Value>;

    async fn patch_event(&self, calendar_id: &str, event_id: &str, patch: &Value)
    -> Result<Value>;
}
