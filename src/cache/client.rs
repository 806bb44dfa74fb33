//! Cached wrapper for the Workspace API client
//!
//! Read-only list/get calls are served from [`ResponseCache`] when a fresh
//! entry exists. Mutations go straight to the inner client and then clear
//! the resource type they touched.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use crate::cache::{ResourceType, ResponseCache, build_key, storage::CacheLookup};
use crate::client::api::{
    CalendarApi, GroupsApi, OrgUnitsApi, ReportsApi, ResourcesApi, TransferApi, UsersApi,
};
use crate::client::query::{ActivityQuery, EventQuery, OrgUnitQuery, UserQuery};
use crate::error::Result;

/// Cached wrapper for any Workspace API implementation.
///
/// With the cache disabled (`--no-cache` or `cache.enabled: false`) every
/// call goes to the inner client.
pub struct CachedClient<C> {
    inner: C,
    cache: ResponseCache,
    ttl: Duration,
}

impl<C> CachedClient<C> {
    /// Wrap `inner`, using the cache's own default TTL for reads and writes
    pub fn new(inner: C, cache: ResponseCache) -> Self {
        let ttl = cache.default_ttl();
        Self { inner, cache, ttl }
    }

    /// Get the inner client
    #[cfg(test)]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    #[cfg(test)]
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Serve from cache or fetch and store
    async fn cached<T, F, Fut>(
        &self,
        resource_type: &str,
        identifier: &str,
        filters: &BTreeMap<String, String>,
        fetch: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = build_key(resource_type, identifier, filters);

        match self.cache.read(&key, self.ttl) {
            Ok(CacheLookup::Hit(data)) => match serde_json::from_value(data) {
                Ok(value) => return Ok(value),
                Err(e) => log::debug!("Discarding cache entry {}: {}", key, e),
            },
            Ok(_) => {}
            Err(e) => log::warn!("Cache read failed for {}: {}", key, e),
        }

        let value = fetch().await?;
        if let Err(e) = self.cache.write(&key, &value, self.ttl) {
            log::warn!("Cache write failed for {}: {}", key, e);
        }
        Ok(value)
    }

    /// Drop cached entries after a mutation
    ///
    /// Also runs with the cache disabled: a `--no-cache` mutation still
    /// drops entries left by earlier cached runs.
    fn invalidate(&self, resource_type: &str) {
        if let Err(e) = self.cache.clear(resource_type) {
            log::warn!("Failed to clear {} cache: {}", resource_type, e);
        }
    }
}

fn no_filters() -> BTreeMap<String, String> {
    BTreeMap::new()
}

// ============================================================================
// UsersApi Implementation
// ============================================================================

#[async_trait]
impl<C: UsersApi> UsersApi for CachedClient<C> {
    async fn list_users(&self, query: &UserQuery) -> Result<Vec<Value>> {
        let identifier = query.domain.as_deref().unwrap_or("all");
        self.cached(ResourceType::USERS, identifier, &query.cache_filters(), || {
            self.inner.list_users(query)
        })
        .await
    }

    async fn get_user(&self, user_key: &str) -> Result<Value> {
        self.cached(ResourceType::USERS, user_key, &no_filters(), || {
            self.inner.get_user(user_key)
        })
        .await
    }

    async fn insert_user(&self, user: &Value) -> Result<Value> {
        let created = self.inner.insert_user(user).await?;
        self.invalidate(ResourceType::USERS);
        Ok(created)
    }

    async fn update_user(&self, user_key: &str, patch: &Value) -> Result<Value> {
        let updated = self.inner.update_user(user_key, patch).await?;
        self.invalidate(ResourceType::USERS);
        Ok(updated)
    }

    async fn sign_out_user(&self, user_key: &str) -> Result<()> {
        self.inner.sign_out_user(user_key).await
    }

    async fn list_aliases(&self, user_key: &str) -> Result<Vec<Value>> {
        self.inner.list_aliases(user_key).await
    }

    async fn insert_alias(&self, user_key: &str, alias: &str) -> Result<Value> {
        let created = self.inner.insert_alias(user_key, alias).await?;
        self.invalidate(ResourceType::USERS);
        Ok(created)
    }

    async fn delete_alias(&self, user_key: &str, alias: &str) -> Result<()> {
        self.inner.delete_alias(user_key, alias).await?;
        self.invalidate(ResourceType::USERS);
        Ok(())
    }
}

// ============================================================================
// GroupsApi Implementation
// ============================================================================

#[async_trait]
impl<C: GroupsApi> GroupsApi for CachedClient<C> {
    async fn list_groups(&self, domain: &str) -> Result<Vec<Value>> {
        self.cached(ResourceType::GROUPS, domain, &no_filters(), || {
            self.inner.list_groups(domain)
        })
        .await
    }

    async fn list_user_groups(&self, user_key: &str) -> Result<Vec<Value>> {
        self.inner.list_user_groups(user_key).await
    }

    async fn get_group(&self, group_key: &str) -> Result<Value> {
        self.cached(ResourceType::GROUPS, group_key, &no_filters(), || {
            self.inner.get_group(group_key)
        })
        .await
    }

    async fn list_members(&self, group_key: &str) -> Result<Vec<Value>> {
        let filters = crate::cache::filters([("view", "members")]);
        self.cached(ResourceType::GROUPS, group_key, &filters, || {
            self.inner.list_members(group_key)
        })
        .await
    }

    async fn insert_member(&self, group_key: &str, member: &Value) -> Result<Value> {
        let created = self.inner.insert_member(group_key, member).await?;
        self.invalidate(ResourceType::GROUPS);
        Ok(created)
    }

    async fn delete_member(&self, group_key: &str, member_key: &str) -> Result<()> {
        self.inner.delete_member(group_key, member_key).await?;
        self.invalidate(ResourceType::GROUPS);
        Ok(())
    }

    async fn get_group_settings(&self, group_email: &str) -> Result<Value> {
        self.inner.get_group_settings(group_email).await
    }

    async fn update_group_settings(&self, group_email: &str, patch: &Value) -> Result<Value> {
        let updated = self.inner.update_group_settings(group_email, patch).await?;
        self.invalidate(ResourceType::GROUPS);
        Ok(updated)
    }
}

// ============================================================================
// OrgUnitsApi Implementation
// ============================================================================

#[async_trait]
impl<C: OrgUnitsApi> OrgUnitsApi for CachedClient<C> {
    async fn list_org_units(&self, query: &OrgUnitQuery) -> Result<Vec<Value>> {
        self.cached(ResourceType::ORG_UNITS, "all", &query.cache_filters(), || {
            self.inner.list_org_units(query)
        })
        .await
    }

    async fn get_org_unit(&self, path: &str) -> Result<Value> {
        self.inner.get_org_unit(path).await
    }

    async fn insert_org_unit(&self, org_unit: &Value) -> Result<Value> {
        let created = self.inner.insert_org_unit(org_unit).await?;
        self.invalidate(ResourceType::ORG_UNITS);
        Ok(created)
    }

    async fn update_org_unit(&self, path: &str, patch: &Value) -> Result<Value> {
        let updated = self.inner.update_org_unit(path, patch).await?;
        self.invalidate(ResourceType::ORG_UNITS);
        Ok(updated)
    }

    async fn delete_org_unit(&self, path: &str) -> Result<()> {
        self.inner.delete_org_unit(path).await?;
        self.invalidate(ResourceType::ORG_UNITS);
        Ok(())
    }
}

// ============================================================================
// ResourcesApi Implementation
// ============================================================================

#[async_trait]
impl<C: ResourcesApi> ResourcesApi for CachedClient<C> {
    async fn list_buildings(&self) -> Result<Vec<Value>> {
        self.cached(ResourceType::RESOURCES, "buildings", &no_filters(), || {
            self.inner.list_buildings()
        })
        .await
    }

    async fn list_calendar_resources(&self) -> Result<Vec<Value>> {
        self.cached(ResourceType::RESOURCES, "calendars", &no_filters(), || {
            self.inner.list_calendar_resources()
        })
        .await
    }

    async fn insert_calendar_resource(&self, resource: &Value) -> Result<Value> {
        let created = self.inner.insert_calendar_resource(resource).await?;
        self.invalidate(ResourceType::RESOURCES);
        Ok(created)
    }

    async fn update_calendar_resource(&self, resource_id: &str, patch: &Value) -> Result<Value> {
        let updated = self.inner.update_calendar_resource(resource_id, patch).await?;
        self.invalidate(ResourceType::RESOURCES);
        Ok(updated)
    }

    async fn delete_calendar_resource(&self, resource_id: &str) -> Result<()> {
        self.inner.delete_calendar_resource(resource_id).await?;
        self.invalidate(ResourceType::RESOURCES);
        Ok(())
    }
}

// ============================================================================
// Uncached APIs
// ============================================================================

#[async_trait]
impl<C: CalendarApi> CalendarApi for CachedClient<C> {
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Value>> {
        self.inner.list_events(query).await
    }

    async fn insert_event(&self, calendar_id: &str, event: &Value) -> Result<Value> {
        self.inner.insert_event(calendar_id, event).await
    }

    async fn patch_event(&self, calendar_id: &str, event_id: &str, patch: &Value) -> Result<Value> {
        self.inner.patch_event(calendar_id, event_id, patch).await
    }
}

#[async_trait]
impl<C: ReportsApi> ReportsApi for CachedClient<C> {
    async fn list_activities(&self, query: &ActivityQuery) -> Result<Vec<Value>> {
        self.inner.list_activities(query).await
    }
}

#[async_trait]
impl<C: TransferApi> TransferApi for CachedClient<C> {
    async fn insert_transfer(&self, transfer: &Value) -> Result<Value> {
        self.inner.insert_transfer(transfer).await
    }

    async fn get_transfer(&self, transfer_id: &str) -> Result<Value> {
        self.inner.get_transfer(transfer_id).await
    }
}
