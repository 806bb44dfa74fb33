//! Display model implementations
//!
//! Each row is a `Serialize` struct implementing [`Record`](crate::output::Record);
//! its serde field names are what the column headers match against.

mod audit;
mod cache;
mod calendar;
mod common;
mod group;
mod orgunit;
mod resource;
mod user;

pub use audit::ActivityRow;
pub use cache::CacheStatusRow;
pub use calendar::EventRow;
pub use group::{GroupAuditRow, MARK_FORMER, MARK_GROUP, MARK_MEMBER, MemberRow};
pub use orgunit::OrgUnitRow;
pub use resource::CalResourceRow;
pub use user::{AliasRow, UserRow};
