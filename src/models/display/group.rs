//! Group audit and membership display models

use serde::Serialize;
use serde_json::Value;

use super::common::text;
use crate::output::Record;

/// Mark for an active member
pub const MARK_MEMBER: &str = "\u{2713}";
/// Mark for a nested group
pub const MARK_GROUP: &str = "\u{271B}";
/// Mark for a member in the former-employees OU
pub const MARK_FORMER: &str = "x";

/// One group in the all-groups audit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAuditRow {
    pub name: String,
    pub description: String,
    pub email: String,
    /// Comma-separated owner and manager emails
    pub owners: String,
    pub inactive_members: bool,
    pub external_members: bool,
    pub former_employees: bool,
}

impl GroupAuditRow {
    pub const HEADERS: &'static [&'static str] = &[
        "Name",
        "Description",
        "Email",
        "Owners",
        "InactiveMembers",
        "ExternalMembers",
        "FormerEmployees",
    ];

    /// Row for `group` before any member has been classified
    pub fn for_group(group: &Value) -> Self {
        Self {
            name: text(group, "/name"),
            description: text(group, "/description"),
            email: text(group, "/email"),
            owners: String::new(),
            inactive_members: false,
            external_members: false,
            former_employees: false,
        }
    }
}

impl Record for GroupAuditRow {}

/// One member of a group, with its status mark
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRow {
    pub email: String,
    pub role: String,
    #[serde(rename = "type")]
    pub member_type: String,
    pub mark: String,
}

impl MemberRow {
    pub const HEADERS: &'static [&'static str] = &["Email", "Role", "Type", "Mark"];

    pub fn new(member: &Value, mark: &str) -> Self {
        Self {
            email: text(member, "/email"),
            role: text(member, "/role"),
            member_type: text(member, "/type"),
            mark: mark.to_string(),
        }
    }
}

impl Record for MemberRow {}
