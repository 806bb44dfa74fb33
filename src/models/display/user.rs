//! User and alias display models

use serde::Serialize;
use serde_json::Value;

use super::common::{flag, text};
use crate::output::Record;

/// One line of `user list`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub name: String,
    pub email: String,
    pub admin: bool,
    pub org_unit_path: String,
}

impl UserRow {
    pub const HEADERS: &'static [&'static str] = &["Name", "Email", "Admin", "OrgUnitPath"];
}

impl Record for UserRow {}

impl From<&Value> for UserRow {
    fn from(user: &Value) -> Self {
        Self {
            name: text(user, "/name/fullName"),
            email: text(user, "/primaryEmail"),
            admin: flag(user, "/isAdmin"),
            org_unit_path: text(user, "/orgUnitPath"),
        }
    }
}

/// One alias of a user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasRow {
    pub alias: String,
    pub primary_email: String,
}

impl AliasRow {
    pub const HEADERS: &'static [&'static str] = &["Alias", "PrimaryEmail"];
}

impl Record for AliasRow {}

impl From<&Value> for AliasRow {
    fn from(alias: &Value) -> Self {
        Self {
            alias: text(alias, "/alias"),
            primary_email: text(alias, "/primaryEmail"),
        }
    }
}
