//! API trait definitions split by responsibility
//!
//! The Workspace API surface is organized into focused sub-traits:
//! - [`UsersApi`] - Users and aliases
//! - [`GroupsApi`] - Groups, members and group settings
//! - [`OrgUnitsApi`] - Organizational units
//! - [`ResourcesApi`] - Buildings and calendar resources
//! - [`CalendarApi`] - Calendar events
//! - [`ReportsApi`] - Audit activities
//! - [`TransferApi`] - Data transfers
//!
//! The [`WorkspaceApi`](super::WorkspaceApi) super-trait combines them.

mod calendar;
mod groups;
mod orgunits;
mod reports;
mod resources;
mod transfer;
mod users;

pub use calendar::CalendarApi;
pub use groups::GroupsApi;
pub use orgunits::OrgUnitsApi;
pub use reports::ReportsApi;
pub use resources::ResourcesApi;
pub use transfer::TransferApi;
pub use users::UsersApi;
