//! Display models for CLI output
//!
//! API payloads stay opaque JSON; these rows pick out the columns each
//! command shows in csv, table and plain output.

pub mod display;

pub use display::{
    ActivityRow, AliasRow, CacheStatusRow, CalResourceRow, EventRow, GroupAuditRow, MARK_FORMER,
    MARK_GROUP, MARK_MEMBER, MemberRow, OrgUnitRow, UserRow,
};
