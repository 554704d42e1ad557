//! CVDW API client.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use super::error::{FetchError, is_rate_limit_error, short_error_message};
use super::resource::Resource;
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::retry::{RetryConfig, with_retry};
use crate::sync::{PageRequest, PageSource, ProgressCallback, SyncProgress, emit};

/// Default CVDW base URL.
pub const DEFAULT_BASE_URL: &str = "https://bpincorporadora.cvcrm.com.br/api/v1/cvdw";

/// Minimum pause before every request, successful or not.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(10);

/// Pause after an HTTP 429 before retrying the same page.
pub const DEFAULT_RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(60);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Pacing and retry policy for upstream requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Sleep before each attempt.
    pub request_delay: Duration,
    /// Sleep after a 429; throttling is retried without limit.
    pub rate_limit_cooldown: Duration,
    /// Backoff for transient failures.
    pub retry: RetryConfig,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            request_delay: DEFAULT_REQUEST_DELAY,
            rate_limit_cooldown: DEFAULT_RATE_LIMIT_COOLDOWN,
            retry: RetryConfig::default(),
        }
    }
}

/// CVDW header credentials.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// CVDW API client.
///
/// Stateless apart from credentials and policy: one GET per page, paced by
/// [`FetchPolicy`].
#[derive(Clone)]
pub struct CvcrmClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    credentials: Credentials,
    policy: FetchPolicy,
}

impl CvcrmClient {
    /// Create a client backed by reqwest.
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        policy: FetchPolicy,
    ) -> Result<Self, FetchError> {
        let transport = ReqwestTransport::with_timeout(REQUEST_TIMEOUT)?;
        Ok(Self::new_with_transport(
            base_url,
            credentials,
            policy,
            Arc::new(transport),
        ))
    }

    pub fn new_with_transport(
        base_url: &str,
        credentials: Credentials,
        policy: FetchPolicy,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            policy,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    fn build_request(
        &self,
        resource: Resource,
        page: u32,
        page_size: u32,
        since: Option<NaiveDate>,
    ) -> HttpRequest {
        let mut query = vec![
            ("pagina".to_string(), page.to_string()),
            ("registros_por_pagina".to_string(), page_size.to_string()),
        ];
        if let Some(date) = since
            && resource.supports_since()
        {
            query.push((
                "a_partir_data_referencia".to_string(),
                date.format("%Y-%m-%d").to_string(),
            ));
        }

        HttpRequest {
            url: format!("{}/{}", self.base_url, resource.path()),
            query,
            headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), "cvsync".to_string()),
                ("email".to_string(), self.credentials.email.clone()),
                ("token".to_string(), self.credentials.token.clone()),
            ],
        }
    }

    /// One paced attempt: delay, GET, classify.
    async fn attempt(&self, request: &HttpRequest) -> Result<Vec<Value>, FetchError> {
        tokio::time::sleep(self.policy.request_delay).await;

        let response: HttpResponse = self.transport.get(request.clone()).await?;

        match response.status {
            429 => Err(FetchError::RateLimited),
            s if (200..300).contains(&s) => parse_page(&response.body),
            status => Err(FetchError::Status {
                status,
                message: String::from_utf8_lossy(&response.body).to_string(),
            }),
        }
    }

    /// Fetch one page of raw records.
    ///
    /// Transient failures retry with backoff up to the policy's attempt
    /// budget. A 429 sleeps the cooldown and retries the same page without
    /// limit; the budget spent before the cooldown stays spent.
    pub async fn fetch(
        &self,
        resource: Resource,
        page: u32,
        page_size: u32,
        since: Option<NaiveDate>,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Value>, FetchError> {
        let request = &self.build_request(resource, page, page_size, since);
        let transient_failures = AtomicUsize::new(0);
        let failures = &transient_failures;
        let mut throttled: u32 = 0;

        loop {
            let budget = self
                .policy
                .retry
                .remaining_after(transient_failures.load(Ordering::SeqCst));
            let result = with_retry(
                move || async move {
                    let outcome = self.attempt(request).await;
                    if matches!(&outcome, Err(err) if err.is_transient()) {
                        failures.fetch_add(1, Ordering::SeqCst);
                    }
                    outcome
                },
                &budget,
                FetchError::is_transient,
                resource,
                page,
                on_progress,
            )
            .await;

            match result {
                Err(err) if is_rate_limit_error(&err) => {
                    throttled += 1;
                    emit(
                        on_progress,
                        SyncProgress::RateLimited {
                            resource,
                            page,
                            cooldown_ms: self.policy.rate_limit_cooldown.as_millis() as u64,
                        },
                    );
                    tracing::warn!(
                        resource = %resource,
                        page,
                        times = throttled,
                        cooldown = ?self.policy.rate_limit_cooldown,
                        "Rate limited, cooling down"
                    );
                    tokio::time::sleep(self.policy.rate_limit_cooldown).await;
                }
                Err(err) => {
                    tracing::warn!(
                        resource = %resource,
                        page,
                        error = %short_error_message(&err),
                        "Fetch failed"
                    );
                    return Err(err);
                }
                Ok(records) => {
                    tracing::debug!(
                        resource = %resource,
                        page,
                        count = records.len(),
                        "Fetched page"
                    );
                    return Ok(records);
                }
            }
        }
    }
}

#[async_trait]
impl PageSource for CvcrmClient {
    async fn fetch_page(
        &self,
        request: PageRequest,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Value>, FetchError> {
        self.fetch(
            request.resource,
            request.page,
            request.page_size,
            request.since,
            on_progress,
        )
        .await
    }
}

/// Extract the record list from a CVDW response body.
///
/// A body without `data` (or with `data: null`) is an empty page.
pub(crate) fn parse_page(body: &[u8]) -> Result<Vec<Value>, FetchError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    let Value::Object(mut object) = value else {
        return Err(FetchError::Malformed(
            "response body is not a JSON object".to_string(),
        ));
    };

    match object.remove("data") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(records)) => Ok(records),
        Some(other) => Err(FetchError::Malformed(format!(
            "`data` is not a list (found {})",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
