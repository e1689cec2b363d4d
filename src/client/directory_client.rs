//! # Directory HTTP Client
//!
//! reqwest-based implementation of [`DirectoryApi`]. Every call runs through
//! the configured [`RetryPolicy`], so transient overload never reaches the
//! sync engine. Conflicts on create calls come back as
//! [`CreateOutcome::Conflict`] and are never retried.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::client::traits::{CreateOutcome, DirectoryApi};
use crate::config::SyncConfig;
use crate::constants::api;
use crate::error::{Result, SyncError};
use crate::models::{
    DepartmentPage, DepartmentPatch, NewDepartment, NewUser, RemoteDepartment, RemoteUser,
};
use crate::resilience::RetryPolicy;

/// HTTP client for one organization of the directory service
#[derive(Clone)]
pub struct DirectoryClient {
    http: Client,
    base_url: String,
    org_id: String,
    page_size: u32,
    retry: RetryPolicy,
}

impl std::fmt::Debug for DirectoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryClient")
            .field("base_url", &self.base_url)
            .field("org_id", &self.org_id)
            .field("page_size", &self.page_size)
            .field("max_attempts", &self.retry.max_attempts())
            .finish_non_exhaustive()
    }
}

impl DirectoryClient {
    /// Build a client from validated configuration.
    ///
    /// The token is sent as `Authorization: OAuth <token>` on every request.
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("{} {}", api::AUTH_SCHEME, config.token))
            .map_err(|e| SyncError::configuration(format!("Invalid token: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(format!("orgsync/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                SyncError::configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self::with_http_client(
            &config.api_base,
            &config.org_id,
            http,
            RetryPolicy::from_config(&config.retry),
        )
        .with_page_size(config.page_size))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_http_client(
        base_url: &str,
        org_id: &str,
        http: Client,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            org_id: org_id.to_string(),
            page_size: api::DEFAULT_PAGE_SIZE,
            retry,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn departments_url(&self) -> String {
        format!("{}/org/{}/departments", self.base_url, self.org_id)
    }

    fn department_url(&self, department_id: &str) -> String {
        format!("{}/{}", self.departments_url(), department_id)
    }

    fn users_url(&self) -> String {
        format!("{}/org/{}/users", self.base_url, self.org_id)
    }

    /// Send the request built by `build`, retrying transient failures.
    async fn send_json<T, F>(&self, operation: &str, build: F) -> Result<T>
    where
        T: DeserializeOwned + Send,
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        self.retry
            .execute(operation, || {
                let request = build();
                async move { read_json(request.send().await?).await }
            })
            .await
    }

    /// Like [`Self::send_json`], but a 409 becomes [`CreateOutcome::Conflict`].
    async fn send_create<T, F>(&self, operation: &str, build: F) -> Result<CreateOutcome<T>>
    where
        T: DeserializeOwned + Send,
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        self.retry
            .execute(operation, || {
                let request = build();
                async move {
                    let response = request.send().await?;
                    if response.status().as_u16() == api::CONFLICT_STATUS {
                        let detail = response.text().await.unwrap_or_default();
                        return Ok(CreateOutcome::Conflict { detail });
                    }
                    read_json(response).await.map(CreateOutcome::Created)
                }
            })
            .await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let body = if body.is_empty() {
            format!("HTTP {status}")
        } else {
            body
        };
        return Err(SyncError::api(status.as_u16(), body));
    }

    serde_json::from_str(&body).map_err(|e| SyncError::Parse(format!("{e}: {body}")))
}

#[async_trait]
impl DirectoryApi for DirectoryClient {
    async fn list_departments_page(&self, page: u32) -> Result<DepartmentPage> {
        let url = self.departments_url();
        debug!("GET {} page={}", url, page);
        self.send_json("list_departments_page", || {
            self.http
                .get(&url)
                .query(&[("page", page), ("perPage", self.page_size)])
        })
        .await
    }

    async fn create_department(
        &self,
        department: &NewDepartment,
    ) -> Result<CreateOutcome<RemoteDepartment>> {
        let url = self.departments_url();
        debug!("POST {} external_id={}", url, department.external_id);
        self.send_create("create_department", || self.http.post(&url).json(department))
            .await
    }

    async fn update_department(
        &self,
        department_id: &str,
        patch: &DepartmentPatch,
    ) -> Result<RemoteDepartment> {
        let url = self.department_url(department_id);
        debug!("PATCH {} external_id={}", url, patch.external_id);
        self.send_json("update_department", || self.http.patch(&url).json(patch))
            .await
    }

    async fn create_user(&self, user: &NewUser) -> Result<CreateOutcome<RemoteUser>> {
        let url = self.users_url();
        debug!("POST {} nickname={}", url, user.nickname);
        self.send_create("create_user", || self.http.post(&url).json(user))
            .await
    }
}
