//! Data Transfer API

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Ownership transfers between users
#[async_trait]
pub trait TransferApi: Send + Sync {
    /// Start a transfer; the response carries its `id` and `overallTransferStatusCode`
    async fn insert_transfer(&self, transfer: &Value) -> Result<Value>;

    async fn get_transfer(&self, transfer_id: &str) -> Result<Value>;
}
