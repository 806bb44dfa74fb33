//! Calendar event display model

use serde::Serialize;
use serde_json::Value;

use super::common::text;
use crate::output::Record;
use crate::output::formatters::format_rfc3339_local;

#[derive(Debug, Clone, Serialize)]
pub struct EventRow {
    pub start: String,
    pub summary: String,
    pub location: String,
    pub organizer: String,
}

impl EventRow {
    pub const HEADERS: &'static [&'static str] = &["Start", "Summary", "Location", "Organizer"];
}

impl Record for EventRow {}

impl From<&Value> for EventRow {
    fn from(event: &Value) -> Self {
        // All-day events carry `date` instead of `dateTime`
        let start = match event.pointer("/start/dateTime").and_then(Value::as_str) {
            Some(dt) => format_rfc3339_local(dt),
            None => text(event, "/start/date"),
        };

        Self {
            start,
            summary: text(event, "/summary"),
            location: text(event, "/location"),
            organizer: text(event, "/organizer/email"),
        }
    }
}
