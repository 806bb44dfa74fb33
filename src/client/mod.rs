//! Google Workspace API client
//!
//! Payloads are passed through as opaque JSON; the client only knows URLs,
//! paging and error mapping.

pub mod api;
pub mod google;
#[cfg(test)]
pub mod mock;
pub mod parallel;
pub mod query;

pub use api::{
    CalendarApi, GroupsApi, OrgUnitsApi, ReportsApi, ResourcesApi, TransferApi, UsersApi,
};
pub use google::GoogleClient;
#[cfg(test)]
pub use mock::MockWorkspaceClient;
pub use parallel::run_bounded;
pub use query::{ActivityQuery, EventQuery, OrgUnitListType, OrgUnitQuery, UserQuery};

/// Every Workspace API family in one bound
pub trait WorkspaceApi:
    UsersApi + GroupsApi + OrgUnitsApi + ResourcesApi + CalendarApi + ReportsApi + TransferApi
{
}

impl<T> WorkspaceApi for T where
    T: UsersApi + GroupsApi + OrgUnitsApi + ResourcesApi + CalendarApi + ReportsApi + TransferApi
{
}
