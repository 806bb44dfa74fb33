//! Query parameters for list requests
//!
//! Each query type converts to Google's query-string names and to the filter
//! map used for cache keys, so equal queries share a cache entry.

use std::collections::BTreeMap;

/// Page size for directory list calls (API maximum for users)
pub const USERS_PAGE_SIZE: u32 = 500;

/// Page size for group and member list calls (API maximum)
pub const GROUPS_PAGE_SIZE: u32 = 200;

/// Page size for activity reports (API maximum)
pub const ACTIVITIES_PAGE_SIZE: u32 = 1000;

/// Filters for `users.list`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserQuery {
    /// Restrict to one domain instead of the whole customer
    pub domain: Option<String>,
    /// Admin SDK search expression, e.g. `isSuspended=true`
    pub query: Option<String>,
    /// `basic` or `full`
    pub projection: Option<String>,
}

impl UserQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn projection(mut self, projection: impl Into<String>) -> Self {
        self.projection = Some(projection.into());
        self
    }

    /// Query-string parameters (customer and paging are added by the client)
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(ref domain) = self.domain {
            params.push(("domain", domain.clone()));
        }
        if let Some(ref query) = self.query {
            params.push(("query", query.clone()));
        }
        if let Some(ref projection) = self.projection {
            params.push(("projection", projection.clone()));
        }
        params
    }

    /// Filters that distinguish cache entries (domain is the key identifier)
    pub fn cache_filters(&self) -> BTreeMap<String, String> {
        self.to_query_params()
            .into_iter()
            .filter(|(k, _)| *k != "domain")
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }
}

/// `orgunits.list` type parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OrgUnitListType {
    /// Every descendant
    #[default]
    All,
    /// Immediate children only
    Children,
}

impl OrgUnitListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgUnitListType::All => "all",
            OrgUnitListType::Children => "children",
        }
    }
}

/// Filters for `orgunits.list`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrgUnitQuery {
    /// Parent path to list under; the root when absent
    pub org_unit_path: Option<String>,
    pub list_type: OrgUnitListType,
}

impl OrgUnitQuery {
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("type", self.list_type.as_str().to_string())];
        if let Some(ref path) = self.org_unit_path {
            params.push(("orgUnitPath", path.clone()));
        }
        params
    }

    pub fn cache_filters(&self) -> BTreeMap<String, String> {
        self.to_query_params()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }
}

/// Filters for `activities.list` in the Reports API
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityQuery {
    /// Application name, e.g. `login` or `drive`
    pub application: String,
    /// User email, or `all`
    pub user_key: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub event_names: Vec<String>,
    pub actor_ip: Option<String>,
    /// Stop after this many activities
    pub max_results: Option<usize>,
}

impl ActivityQuery {
    pub fn new(application: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            user_key: "all".to_string(),
            ..Self::default()
        }
    }

    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(ref start) = self.start_time {
            params.push(("startTime", start.clone()));
        }
        if let Some(ref end) = self.end_time {
            params.push(("endTime", end.clone()));
        }
        if !self.event_names.is_empty() {
            params.push(("eventName", self.event_names.join(",")));
        }
        if let Some(ref ip) = self.actor_ip {
            params.push(("actorIpAddress", ip.clone()));
        }
        let page_size = self
            .max_results
            .map(|max| max.min(ACTIVITIES_PAGE_SIZE as usize) as u32)
            .unwrap_or(ACTIVITIES_PAGE_SIZE);
        params.push(("maxResults", page_size.to_string()));
        params
    }
}

/// Filters for `events.list` in the Calendar API
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub calendar_id: String,
    pub max_results: u32,
    pub time_min: Option<String>,
    pub time_max: Option<String>,
}

impl EventQuery {
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("maxResults", self.max_results.to_string()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
        ];
        if let Some(ref min) = self.time_min {
            params.push(("timeMin", min.clone()));
        }
        if let Some(ref max) = self.time_max {
            params.push(("timeMax", max.clone()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_query_params() {
        let query = UserQuery::new()
            .domain("example.com")
            .query("isSuspended=true")
            .projection("full");
        let params = query.to_query_params();

        assert!(params.contains(&("domain", "example.com".to_string())));
        assert!(params.contains(&("query", "isSuspended=true".to_string())));
        assert!(params.contains(&("projection", "full".to_string())));

        let filters = query.cache_filters();
        assert!(!filters.contains_key("domain"));
        assert_eq!(filters.get("query").map(String::as_str), Some("isSuspended=true"));
    }

    #[test]
    fn test_empty_user_query_has_no_filters() {
        assert!(UserQuery::new().cache_filters().is_empty());
    }

    #[test]
    fn test_org_unit_query_params() {
        let query = OrgUnitQuery {
            org_unit_path: Some("/Engineering".to_string()),
            list_type: OrgUnitListType::Children,
        };
        let params = query.to_query_params();
        assert_eq!(params[0], ("type", "children".to_string()));
        assert!(params.contains(&("orgUnitPath", "/Engineering".to_string())));
    }

    #[test]
    fn test_activity_query_caps_page_size() {
        let mut query = ActivityQuery::new("login");
        assert_eq!(query.user_key, "all");
        assert!(query.to_query_params().contains(&("maxResults", "1000".to_string())));

        query.max_results = Some(50);
        query.event_names = vec!["login_success".to_string(), "logout".to_string()];
        let params = query.to_query_params();
        assert!(params.contains(&("maxResults", "50".to_string())));
        assert!(params.contains(&("eventName", "login_success,logout".to_string())));

        query.max_results = Some(5000);
        assert!(query.to_query_params().contains(&("maxResults", "1000".to_string())));
    }

    #[test]
    fn test_event_query_params() {
        let query = EventQuery {
            calendar_id: "primary".to_string(),
            max_results: 10,
            time_min: Some("2025-01-01T00:00:00Z".to_string()),
            time_max: None,
        };
        let params = query.to_query_params();
        assert!(params.contains(&("singleEvents", "true".to_string())));
        assert!(params.contains(&("timeMin", "2025-01-01T00:00:00Z".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "timeMax"));
    }
}
