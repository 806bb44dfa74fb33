//! Mock Workspace API client for testing
//!
//! Keeps every resource in memory so command and cache tests can run without
//! making real API calls. Mutations change the in-memory state and are
//! recorded for assertions.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::api::{
    CalendarApi, GroupsApi, OrgUnitsApi, ReportsApi, ResourcesApi, TransferApi, UsersApi,
};
use super::query::{ActivityQuery, EventQuery, OrgUnitQuery, UserQuery};
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// # Example
/// ```ignore
/// let mock = MockWorkspaceClient::new()
///     .with_users(vec![json!({"primaryEmail": "a@example.com"})])
///     .await;
///
/// let users = mock.list_users(&UserQuery::new()).await?;
/// assert_eq!(users.len(), 1);
/// ```
#[derive(Default)]
pub struct MockWorkspaceClient {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    users: Vec<Value>,
    aliases: HashMap<String, Vec<Value>>,
    groups: Vec<Value>,
    /// Group email -> members
    members: HashMap<String, Vec<Value>>,
    group_settings: HashMap<String, Value>,
    org_units: Vec<Value>,
    buildings: Vec<Value>,
    calendar_resources: Vec<Value>,
    events: Vec<Value>,
    activities: Vec<Value>,
    /// Status codes returned by successive `get_transfer` calls; the last repeats
    transfer_statuses: Vec<String>,
    /// Number of `insert_transfer` calls that fail before one succeeds
    transfer_failures: usize,
    /// Error to return (if any) - consumed on first use
    error: Option<ApiError>,
    call_count: CallCounts,
    captured_requests: Vec<CapturedRequest>,
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub list_users: usize,
    pub get_user: usize,
    pub list_groups: usize,
    pub list_user_groups: usize,
    pub get_group: usize,
    pub list_members: usize,
    pub list_org_units: usize,
    pub list_calendar_resources: usize,
    pub list_buildings: usize,
    pub list_events: usize,
    pub list_activities: usize,
    pub insert_transfer: usize,
    pub get_transfer: usize,
    /// Every mutating call
    pub mutations: usize,
}

impl CallCounts {
    /// Get total number of API calls made.
    pub fn total(&self) -> usize {
        self.list_users
            + self.get_user
            + self.list_groups
            + self.list_user_groups
            + self.get_group
            + self.list_members
            + self.list_org_units
            + self.list_calendar_resources
            + self.list_buildings
            + self.list_events
            + self.list_activities
            + self.insert_transfer
            + self.get_transfer
            + self.mutations
    }
}

/// A captured mutation for test assertions.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// The API method called (e.g., "update_user")
    pub method: String,
    /// User, group, path or resource the call targeted
    pub key: Option<String>,
    pub body: Option<Value>,
}

fn matches_key(item: &Value, key: &str, fields: &[&str]) -> bool {
    fields
        .iter()
        .any(|field| item.get(*field).and_then(Value::as_str) == Some(key))
}

/// Shallow-merge `patch` into `target`
fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (k, v) in patch {
            target.insert(k.clone(), v.clone());
        }
    }
}

fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

impl MockWorkspaceClient {
    /// Create a new mock client with default (empty) responses.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_users(self, users: Vec<Value>) -> Self {
        self.state.lock().await.users = users;
        self
    }

    pub async fn with_aliases(self, user_key: &str, aliases: Vec<Value>) -> Self {
        self.state
            .lock()
            .await
            .aliases
            .insert(user_key.to_string(), aliases);
        self
    }

    pub async fn with_groups(self, groups: Vec<Value>) -> Self {
        self.state.lock().await.groups = groups;
        self
    }

    pub async fn with_members(self, group_key: &str, members: Vec<Value>) -> Self {
        self.state
            .lock()
            .await
            .members
            .insert(group_key.to_string(), members);
        self
    }

    pub async fn with_group_settings(self, group_email: &str, settings: Value) -> Self {
        self.state
            .lock()
            .await
            .group_settings
            .insert(group_email.to_string(), settings);
        self
    }

    pub async fn with_org_units(self, org_units: Vec<Value>) -> Self {
        self.state.lock().await.org_units = org_units;
        self
    }

    pub async fn with_buildings(self, buildings: Vec<Value>) -> Self {
        self.state.lock().await.buildings = buildings;
        self
    }

    pub async fn with_calendar_resources(self, resources: Vec<Value>) -> Self {
        self.state.lock().await.calendar_resources = resources;
        self
    }

    pub async fn with_events(self, events: Vec<Value>) -> Self {
        self.state.lock().await.events = events;
        self
    }

    pub async fn with_activities(self, activities: Vec<Value>) -> Self {
        self.state.lock().await.activities = activities;
        self
    }

    /// Configure the status codes successive `get_transfer` calls report.
    pub async fn with_transfer_statuses(self, statuses: &[&str]) -> Self {
        self.state.lock().await.transfer_statuses =
            statuses.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Make the first `failures` transfer submissions fail with a server error.
    pub async fn with_transfer_failures(self, failures: usize) -> Self {
        self.state.lock().await.transfer_failures = failures;
        self
    }

    /// Configure an error to return on the next API call.
    /// The error is consumed after one use.
    pub async fn with_error(self, error: ApiError) -> Self {
        self.state.lock().await.error = Some(error);
        self
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.state.lock().await.call_count.clone()
    }

    /// Get all captured mutations for test assertions.
    pub async fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.state.lock().await.captured_requests.clone()
    }

    /// Current stored users (reflects mutations)
    pub async fn users(&self) -> Vec<Value> {
        self.state.lock().await.users.clone()
    }

    /// Current members of a group (reflects mutations)
    pub async fn members(&self, group_key: &str) -> Vec<Value> {
        self.state
            .lock()
            .await
            .members
            .get(group_key)
            .cloned()
            .unwrap_or_default()
    }
}

impl MockState {
    /// Check if there's a pending error and consume it.
    fn check_error(&mut self) -> Result<()> {
        match self.error.take() {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Record a mutation and consume any pending error.
    fn mutation(&mut self, method: &str, key: Option<&str>, body: Option<&Value>) -> Result<()> {
        self.check_error()?;
        self.call_count.mutations += 1;
        self.captured_requests.push(CapturedRequest {
            method: method.to_string(),
            key: key.map(str::to_string),
            body: body.cloned(),
        });
        Ok(())
    }

    fn user_mut(&mut self, user_key: &str) -> Result<&mut Value> {
        self.users
            .iter_mut()
            .find(|u| matches_key(u, user_key, &["primaryEmail", "id"]))
            .ok_or_else(|| ApiError::NotFound(format!("user {}", user_key)).into())
    }
}

// ============================================================================
// UsersApi Implementation
// ============================================================================

#[async_trait]
impl UsersApi for MockWorkspaceClient {
    async fn list_users(&self, query: &UserQuery) -> Result<Vec<Value>> {
        let mut state = self.state.lock().await;
        state.check_error()?;
        state.call_count.list_users += 1;

        let users = state.users.clone();
        Ok(match query.domain.as_deref() {
            Some(domain) => users
                .into_iter()
                .filter(|u| {
                    u.get("primaryEmail")
                        .and_then(Value::as_str)
                        .is_some_and(|e| e.ends_with(&format!("@{}", domain)))
                })
                .collect(),
            None => users,
        })
    }

    async fn get_user(&self, user_key: &str) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.check_error()?;
        state.call_count.get_user += 1;
        state.user_mut(user_key).map(|u| u.clone())
    }

    async fn insert_user(&self, user: &Value) -> Result<Value> {
        let mut state = self.state.lock().await;
        let email = user.get("primaryEmail").and_then(Value::as_str);
        state.mutation("insert_user", email, Some(user))?;

        if let Some(email) = email
            && state.user_mut(email).is_ok()
        {
            return Err(ApiError::Conflict(format!("Entity already exists: {}", email)).into());
        }
        let mut created = user.clone();
        merge(&mut created, &json!({ "id": format!("{}", state.users.len() + 1) }));
        state.users.push(created.clone());
        Ok(created)
    }

    async fn update_user(&self, user_key: &str, patch: &Value) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.mutation("update_user", Some(user_key), Some(patch))?;
        let user = state.user_mut(user_key)?;
        merge(user, patch);
        Ok(user.clone())
    }

    async fn sign_out_user(&self, user_key: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.mutation("sign_out_user", Some(user_key), None)?;
        state.user_mut(user_key).map(|_| ())
    }

    async fn list_aliases(&self, user_key: &str) -> Result<Vec<Value>> {
        let mut state = self.state.lock().await;
        state.check_error()?;
        Ok(state.aliases.get(user_key).cloned().unwrap_or_default())
    }

    async fn insert_alias(&self, user_key: &str, alias: &str) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.mutation("insert_alias", Some(user_key), Some(&json!({ "alias": alias })))?;
        let entry = json!({ "alias": alias, "primaryEmail": user_key });
        state
            .aliases
            .entry(user_key.to_string())
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }

    async fn delete_alias(&self, user_key: &str, alias: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.mutation("delete_alias", Some(user_key), Some(&json!({ "alias": alias })))?;
        let aliases = state.aliases.entry(user_key.to_string()).or_default();
        let before = aliases.len();
        aliases.retain(|a| !matches_key(a, alias, &["alias"]));
        if aliases.len() == before {
            return Err(ApiError::NotFound(format!("alias {}", alias)).into());
        }
        Ok(())
    }
}

// ============================================================================
// GroupsApi Implementation
// ============================================================================

#[async_trait]
impl GroupsApi for MockWorkspaceClient {
    async fn list_groups(&self, _domain: &str) -> Result<Vec<Value>> {
        let mut state = self.state.lock().await;
        state.check_error()?;
        state.call_count.list_groups += 1;
        Ok(state.groups.clone())
    }

    async fn list_user_groups(&self, user_key: &str) -> Result<Vec<Value>> {
        let mut state = self.state.lock().await;
        state.check_error()?;
        state.call_count.list_user_groups += 1;

        let groups = state
            .groups
            .iter()
            .filter(|g| {
                let email = g.get("email").and_then(Value::as_str).unwrap_or_default();
                state
                    .members
                    .get(email)
                    .is_some_and(|ms| ms.iter().any(|m| matches_key(m, user_key, &["email", "id"])))
            })
            .cloned()
            .collect();
        Ok(groups)
    }

    async fn get_group(&self, group_key: &str) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.check_error()?;
        state.call_count.get_group += 1;
        state
            .groups
            .iter()
            .find(|g| matches_key(g, group_key, &["email", "id"]))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("group {}", group_key)).into())
    }

    async fn list_members(&self, group_key: &str) -> Result<Vec<Value>> {
        let mut state = self.state.lock().await;
        state.check_error()?;
        state.call_count.list_members += 1;
        Ok(state.members.get(group_key).cloned().unwrap_or_default())
    }

    async fn insert_member(&self, group_key: &str, member: &Value) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.mutation("insert_member", Some(group_key), Some(member))?;
        let members = state.members.entry(group_key.to_string()).or_default();
        if let Some(email) = member.get("email").and_then(Value::as_str)
            && members.iter().any(|m| matches_key(m, email, &["email"]))
        {
            return Err(ApiError::Conflict("Member already exists".to_string()).into());
        }
        members.push(member.clone());
        Ok(member.clone())
    }

    async fn delete_member(&self, group_key: &str, member_key: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.mutation("delete_member", Some(group_key), Some(&json!({ "member": member_key })))?;
        let members = state.members.entry(group_key.to_string()).or_default();
        let before = members.len();
        members.retain(|m| !matches_key(m, member_key, &["email", "id"]));
        if members.len() == before {
            return Err(ApiError::NotFound(format!("member {}", member_key)).into());
        }
        Ok(())
    }

    async fn get_group_settings(&self, group_email: &str) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.check_error()?;
        state
            .group_settings
            .get(group_email)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("group {}", group_email)).into())
    }

    async fn update_group_settings(&self, group_email: &str, patch: &Value) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.mutation("update_group_settings", Some(group_email), Some(patch))?;
        let settings = state
            .group_settings
            .entry(group_email.to_string())
            .or_insert_with(|| json!({ "email": group_email }));
        merge(settings, patch);
        Ok(settings.clone())
    }
}

// ============================================================================
// OrgUnitsApi Implementation
// ============================================================================

#[async_trait]
impl OrgUnitsApi for MockWorkspaceClient {
    async fn list_org_units(&self, _query: &OrgUnitQuery) -> Result<Vec<Value>> {
        let mut state = self.state.lock().await;
        state.check_error()?;
        state.call_count.list_org_units += 1;
        Ok(state.org_units.clone())
    }

    async fn get_org_unit(&self, path: &str) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.check_error()?;
        let path = normalize_path(path);
        state
            .org_units
            .iter()
            .find(|ou| matches_key(ou, &path, &["orgUnitPath"]))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("org unit {}", path)).into())
    }

    async fn insert_org_unit(&self, org_unit: &Value) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.mutation("insert_org_unit", None, Some(org_unit))?;
        let parent = org_unit
            .get("parentOrgUnitPath")
            .and_then(Value::as_str)
            .unwrap_or("/");
        let name = org_unit.get("name").and_then(Value::as_str).unwrap_or_default();
        let mut created = org_unit.clone();
        merge(
            &mut created,
            &json!({ "orgUnitPath": normalize_path(&format!("{}/{}", parent, name)) }),
        );
        state.org_units.push(created.clone());
        Ok(created)
    }

    async fn update_org_unit(&self, path: &str, patch: &Value) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.mutation("update_org_unit", Some(path), Some(patch))?;
        let path = normalize_path(path);
        let ou = state
            .org_units
            .iter_mut()
            .find(|ou| matches_key(ou, &path, &["orgUnitPath"]))
            .ok_or_else(|| ApiError::NotFound(format!("org unit {}", path)))?;
        merge(ou, patch);
        Ok(ou.clone())
    }

    async fn delete_org_unit(&self, path: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.mutation("delete_org_unit", Some(path), None)?;
        let path = normalize_path(path);
        let before = state.org_units.len();
        state
            .org_units
            .retain(|ou| !matches_key(ou, &path, &["orgUnitPath"]));
        if state.org_units.len() == before {
            return Err(ApiError::NotFound(format!("org unit {}", path)).into());
        }
        Ok(())
    }
}

// ============================================================================
// ResourcesApi Implementation
// ============================================================================

#[async_trait]
impl ResourcesApi for MockWorkspaceClient {
    async fn list_buildings(&self) -> Result<Vec<Value>> {
        let mut state = self.state.lock().await;
        state.check_error()?;
        state.call_count.list_buildings += 1;
        Ok(state.buildings.clone())
    }

    async fn list_calendar_resources(&self) -> Result<Vec<Value>> {
        let mut state = self.state.lock().await;
        state.check_error()?;
        state.call_count.list_calendar_resources += 1;
        Ok(state.calendar_resources.clone())
    }

    async fn insert_calendar_resource(&self, resource: &Value) -> Result<Value> {
        let mut state = self.state.lock().await;
        let id = resource.get("resourceId").and_then(Value::as_str);
        state.mutation("insert_calendar_resource", id, Some(resource))?;
        state.calendar_resources.push(resource.clone());
        Ok(resource.clone())
    }

    async fn update_calendar_resource(&self, resource_id: &str, patch: &Value) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.mutation("update_calendar_resource", Some(resource_id), Some(patch))?;
        let resource = state
            .calendar_resources
            .iter_mut()
            .find(|r| matches_key(r, resource_id, &["resourceId"]))
            .ok_or_else(|| ApiError::NotFound(format!("resource {}", resource_id)))?;
        merge(resource, patch);
        Ok(resource.clone())
    }

    async fn delete_calendar_resource(&self, resource_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.mutation("delete_calendar_resource", Some(resource_id), None)?;
        let before = state.calendar_resources.len();
        state
            .calendar_resources
            .retain(|r| !matches_key(r, resource_id, &["resourceId"]));
        if state.calendar_resources.len() == before {
            return Err(ApiError::NotFound(format!("resource {}", resource_id)).into());
        }
        Ok(())
    }
}

// ============================================================================
// CalendarApi Implementation
// ============================================================================

#[async_trait]
impl CalendarApi for MockWorkspaceClient {
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Value>> {
        let mut state = self.state.lock().await;
        state.check_error()?;
        state.call_count.list_events += 1;
        Ok(state
            .events
            .iter()
            .take(query.max_results as usize)
            .cloned()
            .collect())
    }

    async fn insert_event(&self, calendar_id: &str, event: &Value) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.mutation("insert_event", Some(calendar_id), Some(event))?;
        let mut created = event.clone();
        merge(
            &mut created,
            &json!({
                "id": format!("evt{}", state.events.len() + 1),
                "htmlLink": "https://calendar.google.com/event?eid=mock",
            }),
        );
        state.events.push(created.clone());
        Ok(created)
    }

    async fn patch_event(&self, calendar_id: &str, event_id: &str, patch: &Value) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.mutation("patch_event", Some(calendar_id), Some(patch))?;
        let event = state
            .events
            .iter_mut()
            .find(|e| matches_key(e, event_id, &["id"]))
            .ok_or_else(|| ApiError::NotFound(format!("event {}", event_id)))?;
        merge(event, patch);
        Ok(event.clone())
    }
}

// ============================================================================
// ReportsApi Implementation
// ============================================================================

#[async_trait]
impl ReportsApi for MockWorkspaceClient {
    async fn list_activities(&self, query: &ActivityQuery) -> Result<Vec<Value>> {
        let mut state = self.state.lock().await;
        state.check_error()?;
        state.call_count.list_activities += 1;
        let limit = query.max_results.unwrap_or(usize::MAX);
        Ok(state.activities.iter().take(limit).cloned().collect())
    }
}

// ============================================================================
// TransferApi Implementation
// ============================================================================

#[async_trait]
impl TransferApi for MockWorkspaceClient {
    async fn insert_transfer(&self, transfer: &Value) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.check_error()?;
        state.call_count.insert_transfer += 1;
        state.captured_requests.push(CapturedRequest {
            method: "insert_transfer".to_string(),
            key: None,
            body: Some(transfer.clone()),
        });

        if state.transfer_failures > 0 {
            state.transfer_failures -= 1;
            return Err(ApiError::ServerError("backend unavailable".to_string()).into());
        }

        let status = state
            .transfer_statuses
            .first()
            .cloned()
            .unwrap_or_else(|| "completed".to_string());
        let mut created = transfer.clone();
        merge(
            &mut created,
            &json!({ "id": "transfer-1", "overallTransferStatusCode": status }),
        );
        Ok(created)
    }

    async fn get_transfer(&self, transfer_id: &str) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.check_error()?;
        state.call_count.get_transfer += 1;

        let idx = state.call_count.get_transfer;
        let status = state
            .transfer_statuses
            .get(idx)
            .or(state.transfer_statuses.last())
            .cloned()
            .unwrap_or_else(|| "completed".to_string());
        Ok(json!({ "id": transfer_id, "overallTransferStatusCode": status }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_call_counts() {
        let mock = MockWorkspaceClient::new()
            .with_users(vec![json!({"primaryEmail": "a@example.com"})])
            .await;

        mock.list_users(&UserQuery::new()).await.unwrap();
        mock.list_users(&UserQuery::new()).await.unwrap();
        mock.get_user("a@example.com").await.unwrap();

        let counts = mock.call_counts().await;
        assert_eq!(counts.list_users, 2);
        assert_eq!(counts.get_user, 1);
        assert_eq!(counts.total(), 3);
    }

    #[tokio::test]
    async fn test_mock_error_is_consumed() {
        let mock = MockWorkspaceClient::new()
            .with_error(ApiError::Forbidden("no".to_string()))
            .await;

        assert!(mock.list_groups("example.com").await.is_err());
        assert!(mock.list_groups("example.com").await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_update_user_merges_and_captures() {
        let mock = MockWorkspaceClient::new()
            .with_users(vec![json!({"primaryEmail": "a@example.com", "suspended": false})])
            .await;

        let updated = mock
            .update_user("a@example.com", &json!({"suspended": true}))
            .await
            .unwrap();
        assert_eq!(updated["suspended"], true);

        let requests = mock.captured_requests().await;
        assert_eq!(requests[0].method, "update_user");
        assert_eq!(requests[0].key.as_deref(), Some("a@example.com"));
    }

    #[tokio::test]
    async fn test_mock_unknown_user_is_not_found() {
        let mock = MockWorkspaceClient::new();
        let err = mock.get_user("ghost@example.com").await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Api(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mock_transfer_status_sequence() {
        let mock = MockWorkspaceClient::new()
            .with_transfer_statuses(&["inProgress", "inProgress", "completed"])
            .await;

        let created = mock.insert_transfer(&json!({})).await.unwrap();
        assert_eq!(created["overallTransferStatusCode"], "inProgress");
        assert_eq!(
            mock.get_transfer("transfer-1").await.unwrap()["overallTransferStatusCode"],
            "inProgress"
        );
        assert_eq!(
            mock.get_transfer("transfer-1").await.unwrap()["overallTransferStatusCode"],
            "completed"
        );
        assert_eq!(
            mock.get_transfer("transfer-1").await.unwrap()["overallTransferStatusCode"],
            "completed"
        );
    }
}
