//! Organizational unit display model

use serde::Serialize;
use serde_json::Value;

use super::common::{flag, text};
use crate::output::Record;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnitRow {
    /// Name indented two spaces per level below the root
    pub name: String,
    pub org_unit_path: String,
    pub description: String,
    pub parent_org_unit_path: String,
    pub org_unit_id: String,
    pub block_inheritance: bool,
}

impl OrgUnitRow {
    pub const HEADERS: &'static [&'static str] =
        &["Name", "OrgUnitPath", "Description", "ParentOrgUnitPath", "OrgUnitId"];
}

/// Nesting depth of an org unit path; `/` and `/Top` are both depth 0
pub fn depth(path: &str) -> usize {
    path.matches('/').count().saturating_sub(1)
}

impl Record for OrgUnitRow {}

impl From<&Value> for OrgUnitRow {
    fn from(ou: &Value) -> Self {
        let path = text(ou, "/orgUnitPath");
        Self {
            name: format!("{}{}", "  ".repeat(depth(&path)), text(ou, "/name")),
            org_unit_path: path,
            description: text(ou, "/description"),
            parent_org_unit_path: text(ou, "/parentOrgUnitPath"),
            org_unit_id: text(ou, "/orgUnitId"),
            block_inheritance: flag(ou, "/blockInheritance"),
        }
    }
}
