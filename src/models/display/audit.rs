//! Audit activity display model

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::common::text;
use crate::output::Record;

/// Key fields of one Reports API activity
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRow {
    pub timestamp: String,
    pub actor: String,
    /// Name of the first event in the activity
    pub event: String,
    pub ip_address: String,
    pub application: String,
}

impl ActivityRow {
    pub const HEADERS: &'static [&'static str] =
        &["Timestamp", "Actor", "Event", "IP Address", "Application"];
}

impl Record for ActivityRow {}

impl From<&Value> for ActivityRow {
    fn from(activity: &Value) -> Self {
        let timestamp = activity
            .pointer("/id/time")
            .and_then(Value::as_str)
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| {
                t.with_timezone(&Utc)
                    .format("%Y-%m-%d %H:%M:%S UTC")
                    .to_string()
            })
            .unwrap_or_default();

        Self {
            timestamp,
            actor: text(activity, "/actor/email"),
            event: text(activity, "/events/0/name"),
            ip_address: text(activity, "/ipAddress"),
            application: text(activity, "/id/applicationName"),
        }
    }
}
