//! Calendar resource display model

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use super::common::text;
use crate::output::Record;

#[derive(Debug, Clone, Serialize)]
pub struct CalResourceRow {
    pub name: String,
    pub email: String,
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Building name with its ID, or the bare ID when unknown
    pub building: String,
    pub floor: String,
    pub capacity: i64,
    pub description: String,
}

impl CalResourceRow {
    pub const HEADERS: &'static [&'static str] = &[
        "Name",
        "Email",
        "ID",
        "Type",
        "Building",
        "Floor",
        "Capacity",
        "Description",
    ];

    /// Build a row, resolving the building ID through `buildings` (ID -> name)
    pub fn new(resource: &Value, buildings: &HashMap<String, String>) -> Self {
        let building_id = text(resource, "/buildingId");
        let building = match buildings.get(&building_id) {
            Some(name) if !name.is_empty() => format!("{} ({})", name, building_id),
            _ => building_id,
        };

        Self {
            name: text(resource, "/resourceName"),
            email: text(resource, "/resourceEmail"),
            id: text(resource, "/resourceId"),
            resource_type: text(resource, "/resourceType"),
            building,
            floor: text(resource, "/floorName"),
            capacity: resource
                .pointer("/capacity")
                .and_then(Value::as_i64)
                .unwrap_or(0),
            description: text(resource, "/resourceDescription"),
        }
    }
}

impl Record for CalResourceRow {}
