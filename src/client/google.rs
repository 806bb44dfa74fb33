//! Google Workspace REST client implementation

use async_trait::async_trait;
use chrono::Utc;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client as HttpClient, Method, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::client::api::{
    CalendarApi, GroupsApi, OrgUnitsApi, ReportsApi, ResourcesApi, TransferApi, UsersApi,
};
use crate::client::query::{
    ActivityQuery, EventQuery, GROUPS_PAGE_SIZE, OrgUnitQuery, USERS_PAGE_SIZE, UserQuery,
};
use crate::config::Settings;
use crate::credentials::{ClientSecret, OAuthToken, TokenStore};
use crate::error::{ApiError, ConfigError, CredentialError, Error, Result};

/// Admin SDK host (Directory, Reports, Data Transfer)
const ADMIN_BASE_URL: &str = "https://admin.googleapis.com";

/// Host for the Calendar and Groups Settings APIs
const GOOGLEAPIS_BASE_URL: &str = "https://www.googleapis.com";

const DIRECTORY: &[&str] = &["admin", "directory", "v1"];
const REPORTS: &[&str] = &["admin", "reports", "v1"];
const DATA_TRANSFER: &[&str] = &["admin", "datatransfer", "v1"];
const CALENDAR: &[&str] = &["calendar", "v3"];
const GROUPS_SETTINGS: &[&str] = &["groups", "v1", "groups"];

/// Alias for the account the credentials belong to
const CUSTOMER: &str = "my_customer";

/// Stay well under the Directory API's default per-user quota
const RATE_LIMIT_PER_SECOND: u32 = 20;

/// Google Workspace API client
pub struct GoogleClient {
    http: HttpClient,
    admin_base: Url,
    googleapis_base: Url,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    auth: RwLock<AuthState>,
}

/// Internal authentication state
struct AuthState {
    token: OAuthToken,
    secret: Option<ClientSecret>,
    store: Option<TokenStore>,
}

impl GoogleClient {
    /// Create a client that sends `token` and cannot refresh it
    pub fn new(token: OAuthToken) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("gac/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            http,
            admin_base: parse_base(ADMIN_BASE_URL)?,
            googleapis_base: parse_base(GOOGLEAPIS_BASE_URL)?,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            auth: RwLock::new(AuthState {
                token,
                secret: None,
                store: None,
            }),
        })
    }

    /// Build a client from the credential files named in the settings.
    ///
    /// The token file is required. Without a client secret the token still
    /// works but cannot be refreshed.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let store = TokenStore::new(&settings.token_file);
        let token = store.load()?;

        let secret = match ClientSecret::load(&settings.client_secret) {
            Ok(secret) => Some(secret),
            Err(CredentialError::MissingClientSecret(path)) => {
                log::debug!(
                    "No client secret at {}; token refresh disabled",
                    path.display()
                );
                None
            }
            Err(e) => return Err(e.into()),
        };

        let client = Self::new(token)?.with_refresh(secret, Some(store));
        match settings.api_host.as_deref() {
            Some(host) => client.with_base_url(host),
            None => Ok(client),
        }
    }

    /// Enable refreshing the access token, optionally persisting it
    pub fn with_refresh(mut self, secret: Option<ClientSecret>, store: Option<TokenStore>) -> Self {
        let auth = self.auth.get_mut();
        auth.secret = secret;
        auth.store = store;
        self
    }

    /// Point every API family at one host (for testing)
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        let base = parse_base(base_url)?;
        self.admin_base = base.clone();
        self.googleapis_base = base;
        Ok(self)
    }

    fn url(base: &Url, prefix: &[&str], segments: &[&str]) -> Result<Url> {
        let mut url = base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ConfigError::Invalid(format!("API base URL {} cannot be a base", base)))?;
            path.pop_if_empty().extend(prefix).extend(segments);
        }
        Ok(url)
    }

    fn directory_url(&self, segments: &[&str]) -> Result<Url> {
        Self::url(&self.admin_base, DIRECTORY, segments)
    }

    /// URL for an org unit; the path's own separators become URL segments
    fn org_unit_url(&self, path: &str) -> Result<Url> {
        let mut segments = vec!["customer", CUSTOMER, "orgunits"];
        segments.extend(path.trim_matches('/').split('/').filter(|s| !s.is_empty()));
        self.directory_url(&segments)
    }

    /// Get a usable access token, refreshing it first when expired
    async fn access_token(&self) -> Result<String> {
        let needs_refresh = {
            let auth = self.auth.read().await;
            auth.token.is_expired() && auth.can_refresh()
        };
        if needs_refresh {
            self.refresh(None).await?;
        }

        let auth = self.auth.read().await;
        Ok(auth.token.access_token.clone())
    }

    async fn can_refresh(&self) -> bool {
        self.auth.read().await.can_refresh()
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// `rejected` is the token a 401 came back for; `None` means the token
    /// expired. The check is repeated under the write lock, and a caller
    /// that queued behind another refresh returns without a second POST.
    async fn refresh(&self, rejected: Option<&str>) -> Result<()> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            expires_in: Option<i64>,
            token_type: Option<String>,
        }

        let mut auth = self.auth.write().await;
        let already_fresh = match rejected {
            Some(token) => auth.token.access_token != token,
            None => !auth.token.is_expired(),
        };
        if already_fresh {
            log::debug!("Access token already refreshed");
            return Ok(());
        }

        let (secret, refresh_token) = match (&auth.secret, &auth.token.refresh_token) {
            (Some(secret), Some(refresh_token)) => (secret.clone(), refresh_token.clone()),
            _ => return Err(ApiError::Unauthorized.into()),
        };

        let response = self
            .http
            .post(&secret.token_uri)
            .form(&[
                ("client_id", secret.client_id.as_str()),
                ("client_secret", secret.client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CredentialError::Refresh(format!("HTTP {}: {}", status, body)).into());
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| CredentialError::Refresh(e.to_string()))?;

        auth.token.access_token = parsed.access_token;
        auth.token.expiry = parsed
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));
        if let Some(token_type) = parsed.token_type {
            auth.token.token_type = token_type;
        }

        if let Some(store) = &auth.store
            && let Err(e) = store.save(&auth.token)
        {
            log::warn!("Failed to save refreshed token: {}", e);
        }

        log::info!("Refreshed OAuth2 access token");
        Ok(())
    }

    /// Send one request; a 401 triggers a single refresh-and-retry.
    ///
    /// Returns `None` for empty success bodies (e.g. DELETE).
    async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Option<Value>> {
        let mut refreshed = false;
        loop {
            // Apply rate limiting
            self.rate_limiter.until_ready().await;

            let token = self.access_token().await?;
            log::debug!("{} {}", method, url);

            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .bearer_auth(&token);
            if let Some(body) = body {
                request = request.json(body);
            }
            let response = request.send().await.map_err(ApiError::from)?;

            if response.status() == StatusCode::UNAUTHORIZED && !refreshed && self.can_refresh().await
            {
                log::debug!("Got 401, refreshing token and retrying");
                self.refresh(Some(&token)).await?;
                refreshed = true;
                continue;
            }

            return handle_response(response).await;
        }
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        self.send_json(Method::GET, url, None).await
    }

    async fn send_json(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Value> {
        Ok(self.send(method, url, body).await?.unwrap_or(Value::Null))
    }

    async fn send_empty(&self, method: Method, url: Url) -> Result<()> {
        self.send(method, url, None).await.map(|_| ())
    }

    /// Follow `nextPageToken` and collect the array under `items_field`
    async fn list_all(&self, url: Url, items_field: &str, max: Option<usize>) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut page_url = url.clone();
            if let Some(ref token) = page_token {
                page_url.query_pairs_mut().append_pair("pageToken", token);
            }

            let mut page = self.get_json(page_url).await?;
            if let Some(Value::Array(page_items)) = page.get_mut(items_field).map(Value::take) {
                items.extend(page_items);
            }

            if let Some(max) = max
                && items.len() >= max
            {
                items.truncate(max);
                break;
            }

            page_token = page
                .get("nextPageToken")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            if page_token.is_none() {
                break;
            }
        }

        log::debug!("Fetched {} {}", items.len(), items_field);
        Ok(items)
    }
}

impl AuthState {
    fn can_refresh(&self) -> bool {
        self.secret.is_some() && self.token.refresh_token.is_some()
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| ConfigError::Invalid(format!("API URL '{}': {}", raw, e)).into())
}

fn with_query(mut url: Url, params: &[(&str, String)]) -> Url {
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in params {
            pairs.append_pair(k, v);
        }
    }
    url
}

/// Map an HTTP response to JSON or an [`ApiError`]
async fn handle_response(response: Response) -> Result<Option<Value>> {
    let status = response.status();
    if status.is_success() {
        let bytes = response.bytes().await.map_err(ApiError::from)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        return serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response: {}", e)).into()
        });
    }

    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();
    let message = google_error_message(&body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.to_string()
        } else {
            body.clone()
        }
    });

    let err = match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::FORBIDDEN => ApiError::Forbidden(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::CONFLICT => ApiError::Conflict(message),
        StatusCode::TOO_MANY_REQUESTS => {
            ApiError::RateLimit(Duration::from_secs(retry_after.unwrap_or(60)))
        }
        StatusCode::BAD_REQUEST
        | StatusCode::UNPROCESSABLE_ENTITY
        | StatusCode::PRECONDITION_FAILED => ApiError::BadRequest(message),
        s if s.is_server_error() => ApiError::ServerError(message),
        s => ApiError::InvalidResponse(format!("Unexpected status code {}: {}", s, message)),
    };
    Err(Error::Api(err))
}

/// Extract `error.message` from Google's JSON error envelope
fn google_error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct Envelope {
        error: Detail,
    }
    #[derive(Deserialize)]
    struct Detail {
        message: String,
    }

    serde_json::from_str::<Envelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
}

#[async_trait]
impl UsersApi for GoogleClient {
    async fn list_users(&self, query: &UserQuery) -> Result<Vec<Value>> {
        let mut params = Vec::new();
        if query.domain.is_none() {
            params.push(("customer", CUSTOMER.to_string()));
        }
        params.push(("maxResults", USERS_PAGE_SIZE.to_string()));
        params.extend(query.to_query_params());

        let url = with_query(self.directory_url(&["users"])?, &params);
        self.list_all(url, "users", None).await
    }

    async fn get_user(&self, user_key: &str) -> Result<Value> {
        let url = with_query(
            self.directory_url(&["users", user_key])?,
            &[("projection", "full".to_string())],
        );
        self.get_json(url).await
    }

    async fn insert_user(&self, user: &Value) -> Result<Value> {
        let url = self.directory_url(&["users"])?;
        self.send_json(Method::POST, url, Some(user)).await
    }

    async fn update_user(&self, user_key: &str, patch: &Value) -> Result<Value> {
        let url = self.directory_url(&["users", user_key])?;
        self.send_json(Method::PATCH, url, Some(patch)).await
    }

    async fn sign_out_user(&self, user_key: &str) -> Result<()> {
        let url = self.directory_url(&["users", user_key, "signOut"])?;
        self.send_empty(Method::POST, url).await
    }

    async fn list_aliases(&self, user_key: &str) -> Result<Vec<Value>> {
        let url = self.directory_url(&["users", user_key, "aliases"])?;
        self.list_all(url, "aliases", None).await
    }

    async fn insert_alias(&self, user_key: &str, alias: &str) -> Result<Value> {
        let url = self.directory_url(&["users", user_key, "aliases"])?;
        self.send_json(Method::POST, url, Some(&json!({ "alias": alias })))
            .await
    }

    async fn delete_alias(&self, user_key: &str, alias: &str) -> Result<()> {
        let url = self.directory_url(&["users", user_key, "aliases", alias])?;
        self.send_empty(Method::DELETE, url).await
    }
}

#[async_trait]
impl GroupsApi for GoogleClient {
    async fn list_groups(&self, domain: &str) -> Result<Vec<Value>> {
        let url = with_query(
            self.directory_url(&["groups"])?,
            &[
                ("domain", domain.to_string()),
                ("maxResults", GROUPS_PAGE_SIZE.to_string()),
            ],
        );
        self.list_all(url, "groups", None).await
    }

    async fn list_user_groups(&self, user_key: &str) -> Result<Vec<Value>> {
        let url = with_query(
            self.directory_url(&["groups"])?,
            &[
                ("userKey", user_key.to_string()),
                ("maxResults", GROUPS_PAGE_SIZE.to_string()),
            ],
        );
        self.list_all(url, "groups", None).await
    }

    async fn get_group(&self, group_key: &str) -> Result<Value> {
        let url = self.directory_url(&["groups", group_key])?;
        self.get_json(url).await
    }

    async fn list_members(&self, group_key: &str) -> Result<Vec<Value>> {
        let url = with_query(
            self.directory_url(&["groups", group_key, "members"])?,
            &[("maxResults", GROUPS_PAGE_SIZE.to_string())],
        );
        self.list_all(url, "members", None).await
    }

    async fn insert_member(&self, group_key: &str, member: &Value) -> Result<Value> {
        let url = self.directory_url(&["groups", group_key, "members"])?;
        self.send_json(Method::POST, url, Some(member)).await
    }

    async fn delete_member(&self, group_key: &str, member_key: &str) -> Result<()> {
        let url = self.directory_url(&["groups", group_key, "members", member_key])?;
        self.send_empty(Method::DELETE, url).await
    }

    async fn get_group_settings(&self, group_email: &str) -> Result<Value> {
        let url = with_query(
            Self::url(&self.googleapis_base, GROUPS_SETTINGS, &[group_email])?,
            &[("alt", "json".to_string())],
        );
        self.get_json(url).await
    }

    async fn update_group_settings(&self, group_email: &str, patch: &Value) -> Result<Value> {
        let url = with_query(
            Self::url(&self.googleapis_base, GROUPS_SETTINGS, &[group_email])?,
            &[("alt", "json".to_string())],
        );
        self.send_json(Method::PATCH, url, Some(patch)).await
    }
}

#[async_trait]
impl OrgUnitsApi for GoogleClient {
    async fn list_org_units(&self, query: &OrgUnitQuery) -> Result<Vec<Value>> {
        let url = with_query(
            self.directory_url(&["customer", CUSTOMER, "orgunits"])?,
            &query.to_query_params(),
        );
        self.list_all(url, "organizationUnits", None).await
    }

    async fn get_org_unit(&self, path: &str) -> Result<Value> {
        let url = self.org_unit_url(path)?;
        self.get_json(url).await
    }

    async fn insert_org_unit(&self, org_unit: &Value) -> Result<Value> {
        let url = self.directory_url(&["customer", CUSTOMER, "orgunits"])?;
        self.send_json(Method::POST, url, Some(org_unit)).await
    }

    async fn update_org_unit(&self, path: &str, patch: &Value) -> Result<Value> {
        let url = self.org_unit_url(path)?;
        self.send_json(Method::PATCH, url, Some(patch)).await
    }

    async fn delete_org_unit(&self, path: &str) -> Result<()> {
        let url = self.org_unit_url(path)?;
        self.send_empty(Method::DELETE, url).await
    }
}

#[async_trait]
impl ResourcesApi for GoogleClient {
    async fn list_buildings(&self) -> Result<Vec<Value>> {
        let url = self.directory_url(&["customer", CUSTOMER, "resources", "buildings"])?;
        self.list_all(url, "buildings", None).await
    }

    async fn list_calendar_resources(&self) -> Result<Vec<Value>> {
        let url = with_query(
            self.directory_url(&["customer", CUSTOMER, "resources", "calendars"])?,
            &[("maxResults", USERS_PAGE_SIZE.to_string())],
        );
        self.list_all(url, "items", None).await
    }

    async fn insert_calendar_resource(&self, resource: &Value) -> Result<Value> {
        let url = self.directory_url(&["customer", CUSTOMER, "resources", "calendars"])?;
        self.send_json(Method::POST, url, Some(resource)).await
    }

    async fn update_calendar_resource(&self, resource_id: &str, patch: &Value) -> Result<Value> {
        let url = self.directory_url(&[
            "customer",
            CUSTOMER,
            "resources",
            "calendars",
            resource_id,
        ])?;
        self.send_json(Method::PATCH, url, Some(patch)).await
    }

    async fn delete_calendar_resource(&self, resource_id: &str) -> Result<()> {
        let url = self.directory_url(&[
            "customer",
            CUSTOMER,
            "resources",
            "calendars",
            resource_id,
        ])?;
        self.send_empty(Method::DELETE, url).await
    }
}

#[async_trait]
impl CalendarApi for GoogleClient {
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<Value>> {
        let url = with_query(
            Self::url(
                &self.googleapis_base,
                CALENDAR,
                &["calendars", &query.calendar_id, "events"],
            )?,
            &query.to_query_params(),
        );
        self.list_all(url, "items", Some(query.max_results as usize))
            .await
    }

    async fn insert_event(&self, calendar_id: &str, event: &Value) -> Result<Value> {
        let url = Self::url(
            &self.googleapis_base,
            CALENDAR,
            &["calendars", calendar_id, "events"],
        )?;
        self.send_json(Method::POST, url, Some(event)).await
    }

    async fn patch_event(&self, calendar_id: &str, event_id: &str, patch: &Value) -> Result<Value> {
        let url = Self::url(
            &self.googleapis_base,
            CALENDAR,
            &["calendars", calendar_id, "events", event_id],
        )?;
        self.send_json(Method::PATCH, url, Some(patch)).await
    }
}

#[async_trait]
impl ReportsApi for GoogleClient {
    async fn list_activities(&self, query: &ActivityQuery) -> Result<Vec<Value>> {
        let url = with_query(
            Self::url(
                &self.admin_base,
                REPORTS,
                &[
                    "activity",
                    "users",
                    &query.user_key,
                    "applications",
                    &query.application,
                ],
            )?,
            &query.to_query_params(),
        );
        self.list_all(url, "items", query.max_results).await
    }
}

#[async_trait]
impl TransferApi for GoogleClient {
    async fn insert_transfer(&self, transfer: &Value) -> Result<Value> {
        let url = Self::url(&self.admin_base, DATA_TRANSFER, &["transfers"])?;
        self.send_json(Method::POST, url, Some(transfer)).await
    }

    async fn get_transfer(&self, transfer_id: &str) -> Result<Value> {
        let url = Self::url(&self.admin_base, DATA_TRANSFER, &["transfers", transfer_id])?;
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn token(access: &str) -> OAuthToken {
        OAuthToken {
            access_token: access.to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: None,
            expiry: None,
        }
    }

    fn client_for(server: &mockito::ServerGuard, access: &str) -> GoogleClient {
        GoogleClient::new(token(access))
            .unwrap()
            .with_base_url(&server.url())
            .unwrap()
    }

    #[test]
    fn test_client_creation() {
        assert!(GoogleClient::new(token("t")).is_ok());
    }

    #[test]
    fn test_org_unit_url_encodes_segments() {
        let client = GoogleClient::new(token("t")).unwrap();
        let url = client.org_unit_url("/Former employees/2024").unwrap();
        assert_eq!(
            url.as_str(),
            "https://admin.googleapis.com/admin/directory/v1/customer/my_customer/orgunits/Former%20employees/2024"
        );
    }

    #[test]
    fn test_google_error_message_extraction() {
        let body = r#"{"error":{"code":404,"message":"Resource Not Found: userKey","errors":[]}}"#;
        assert_eq!(
            google_error_message(body).as_deref(),
            Some("Resource Not Found: userKey")
        );
        assert!(google_error_message("plain text").is_none());
    }

    #[tokio::test]
    async fn test_list_users_follows_page_tokens() {
        let mut server = mockito::Server::new_async().await;
        let page1 = server
            .mock("GET", "/admin/directory/v1/users")
            .match_query(Matcher::Exact("customer=my_customer&maxResults=500".into()))
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body(r#"{"users":[{"primaryEmail":"a@example.com"}],"nextPageToken":"p2"}"#)
            .create_async()
            .await;
        let page2 = server
            .mock("GET", "/admin/directory/v1/users")
            .match_query(Matcher::Exact(
                "customer=my_customer&maxResults=500&pageToken=p2".into(),
            ))
            .with_status(200)
            .with_body(r#"{"users":[{"primaryEmail":"b@example.com"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server, "tok");
        let users = client.list_users(&UserQuery::new()).await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[1]["primaryEmail"], "b@example.com");
        page1.assert_async().await;
        page2.assert_async().await;
    }

    #[tokio::test]
    async fn test_not_found_surfaces_google_message() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/admin/directory/v1/users/ghost@example.com")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":{"code":404,"message":"Resource Not Found: userKey"}}"#)
            .create_async()
            .await;

        let client = client_for(&server, "tok");
        let err = client.get_user("ghost@example.com").await.unwrap_err();

        assert!(matches!(err, Error::Api(ApiError::NotFound(ref m)) if m.contains("userKey")));
    }

    #[tokio::test]
    async fn test_delete_with_empty_body() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("DELETE", "/admin/directory/v1/users/a@example.com/aliases/al@example.com")
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server, "tok");
        client
            .delete_alias("a@example.com", "al@example.com")
            .await
            .unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_refreshes_once_and_retries() {
        let mut server = mockito::Server::new_async().await;
        let _stale = server
            .mock("GET", "/admin/directory/v1/groups/eng@example.com")
            .match_header("authorization", "Bearer old")
            .with_status(401)
            .create_async()
            .await;
        let fresh = server
            .mock("GET", "/admin/directory/v1/groups/eng@example.com")
            .match_header("authorization", "Bearer new")
            .with_status(200)
            .with_body(r#"{"email":"eng@example.com"}"#)
            .create_async()
            .await;
        let token_endpoint = server
            .mock("POST", "/token")
            .match_body(Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()))
            .with_status(200)
            .with_body(r#"{"access_token":"new","expires_in":3600,"token_type":"Bearer"}"#)
            .create_async()
            .await;

        let temp = tempfile::TempDir::new().unwrap();
        let store = TokenStore::new(temp.path().join("gac.json"));
        let mut stale = token("old");
        stale.refresh_token = Some("1//refresh".to_string());
        let secret = ClientSecret {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            token_uri: format!("{}/token", server.url()),
        };

        let client = GoogleClient::new(stale)
            .unwrap()
            .with_refresh(Some(secret), Some(store.clone()))
            .with_base_url(&server.url())
            .unwrap();

        let group = client.get_group("eng@example.com").await.unwrap();
        assert_eq!(group["email"], "eng@example.com");
        fresh.assert_async().await;
        token_endpoint.assert_async().await;

        // The refreshed token was persisted
        assert_eq!(store.load().unwrap().access_token, "new");
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_refresh() {
        let mut server = mockito::Server::new_async().await;
        let groups = server
            .mock("GET", "/admin/directory/v1/groups/eng@example.com")
            .match_header("authorization", "Bearer new")
            .with_status(200)
            .with_body(r#"{"email":"eng@example.com"}"#)
            .expect(5)
            .create_async()
            .await;
        let token_endpoint = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"access_token":"new","expires_in":3600}"#)
            .expect(1)
            .create_async()
            .await;

        let mut expired = token("old");
        expired.refresh_token = Some("1//refresh".to_string());
        expired.expiry = Some(Utc::now() - chrono::Duration::hours(1));
        let secret = ClientSecret {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            token_uri: format!("{}/token", server.url()),
        };
        let client = GoogleClient::new(expired)
            .unwrap()
            .with_refresh(Some(secret), None)
            .with_base_url(&server.url())
            .unwrap();

        let results =
            futures::future::join_all((0..5).map(|_| client.get_group("eng@example.com"))).await;
        assert!(results.iter().all(|r| r.is_ok()));
        groups.assert_async().await;
        token_endpoint.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_without_refresh_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/admin/directory/v1/groups/eng@example.com")
            .with_status(401)
            .create_async()
            .await;

        let client = client_for(&server, "tok");
        let err = client.get_group("eng@example.com").await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_activities_stop_at_max_results() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock(
                "GET",
                "/admin/reports/v1/activity/users/all/applications/login",
            )
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"items":[{"id":1},{"id":2},{"id":3}],"nextPageToken":"more"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server, "tok");
        let mut query = ActivityQuery::new("login");
        query.max_results = Some(2);
        let items = client.list_activities(&query).await.unwrap();

        assert_eq!(items.len(), 2);
    }
}
