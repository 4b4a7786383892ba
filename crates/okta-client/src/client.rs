//! HTTP client for the Okta management API.
//!
//! Every call goes through the same path: wait for a concurrency permit,
//! send, classify the response, and back off on HTTP 429 according to the
//! client's [`RetryPolicy`]. The permit is released while backing off so a
//! throttled call does not hold up others.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::models::IdpDiscoveryRule;
use crate::retry::{AttemptFailure, MAX_RETRIES_CEILING, RetryPolicy};
use crate::traits::PolicyRuleApi;

/// Header carrying the epoch second at which the rate-limit window resets.
const RATE_LIMIT_RESET: &str = "x-rate-limit-reset";

/// Configuration for [`OktaClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://acme.okta.com`.
    pub base_url: Url,

    /// API token sent as `Authorization: SSWS <token>`.
    pub api_token: String,

    /// Maximum number of requests in flight across all clones of the client.
    pub parallelism: usize,

    /// Retry policy applied to every call.
    pub retry: RetryPolicy,

    /// Timeout for a single HTTP attempt.
    pub request_timeout: Duration,

    pub user_agent: String,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &"<redacted>")
            .field("parallelism", &self.parallelism)
            .field("retry", &self.retry)
            .field("request_timeout", &self.request_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a configuration with serialized requests and the default retry policy.
    #[must_use]
    pub fn new(base_url: Url, api_token: impl Into<String>) -> Self {
        Self {
            base_url,
            api_token: api_token.into(),
            parallelism: 1,
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("okta-provider/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Sets the concurrency bound.
    #[must_use]
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Client for Okta policy rule endpoints.
///
/// Cloning is cheap; clones share the connection pool, the concurrency
/// limiter and the cancellation token.
#[derive(Clone)]
pub struct OktaClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    limiter: Arc<Semaphore>,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

impl fmt::Debug for OktaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OktaClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl OktaClient {
    /// Builds a client from its configuration.
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        if config.parallelism == 0 {
            return Err(ApiError::invalid_config("parallelism must be at least 1"));
        }
        if config.retry.max_retries > MAX_RETRIES_CEILING {
            return Err(ApiError::invalid_config(format!(
                "max_retries must be at most {MAX_RETRIES_CEILING}"
            )));
        }
        if config.api_token.is_empty() {
            return Err(ApiError::invalid_config("api token must not be empty"));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ApiError::invalid_config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            api_token: config.api_token,
            limiter: Arc::new(Semaphore::new(config.parallelism)),
            retry: config.retry,
            cancel: CancellationToken::new(),
        })
    }

    /// Uses `token` to abort in-progress retries.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that aborts retries of every call made through this client.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Base URL with any trailing slash removed.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn rules_url(&self, policy_id: &str) -> String {
        format!("{}/api/v1/policies/{policy_id}/rules", self.base_url)
    }

    fn rule_url(&self, policy_id: &str, rule_id: &str) -> String {
        format!("{}/{rule_id}", self.rules_url(policy_id))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> ApiResult<T> {
        let text = self.send(operation, method, url, body).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::decode(e.to_string()))
    }

    async fn send(
        &self,
        operation: &str,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> ApiResult<String> {
        let method = &method;
        self.retry
            .execute(operation, &self.cancel, move || {
                self.attempt(method, url, body)
            })
            .await
    }

    async fn attempt(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<String, AttemptFailure> {
        let _permit = tokio::select! {
            permit = self.limiter.acquire() => permit.map_err(|_| ApiError::Cancelled)?,
            () = self.cancel.cancelled() => {
                tracing::debug!(%method, url, "Cancelled while waiting for a permit");
                return Err(ApiError::Cancelled.into());
            }
        };

        tracing::debug!(%method, url, "Sending request");

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(AUTHORIZATION, format!("SSWS {}", self.api_token))
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();
        if status.is_success() {
            return response
                .text()
                .await
                .map_err(|e| ApiError::decode(e.to_string()).into());
        }

        let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
            retry_hint(response.headers())
        } else {
            None
        };
        let text = response.text().await.unwrap_or_default();
        let error = ApiError::from_response(status.as_u16(), &text);
        tracing::debug!(%method, url, status = status.as_u16(), error = %error, "Request failed");

        Err(AttemptFailure { error, retry_after })
    }
}

/// Reads the epoch second at which the rate-limit window reopens.
fn retry_hint(headers: &HeaderMap) -> Option<Duration> {
    let reset = headers
        .get(RATE_LIMIT_RESET)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())?;

    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    let wait = reset.saturating_sub(now).max(0);
    Some(Duration::from_secs(wait.unsigned_abs()))
}

fn to_body(rule: &IdpDiscoveryRule) -> ApiResult<Value> {
    serde_json::to_value(rule).map_err(|e| ApiError::decode(format!("failed to encode rule: {e}")))
}

#[async_trait]
impl PolicyRuleApi for OktaClient {
    async fn get_rule(&self, policy_id: &str, rule_id: &str) -> ApiResult<IdpDiscoveryRule> {
        let url = self.rule_url(policy_id, rule_id);
        self.send_json("get_rule", Method::GET, &url, None).await
    }

    async fn create_rule(
        &self,
        policy_id: &str,
        rule: &IdpDiscoveryRule,
    ) -> ApiResult<IdpDiscoveryRule> {
        let url = self.rules_url(policy_id);
        let body = to_body(rule)?;
        self.send_json("create_rule", Method::POST, &url, Some(&body))
            .await
    }

    async fn update_rule(
        &self,
        policy_id: &str,
        rule_id: &str,
        rule: &IdpDiscoveryRule,
    ) -> ApiResult<IdpDiscoveryRule> {
        let url = self.rule_url(policy_id, rule_id);
        let body = to_body(rule)?;
        self.send_json("update_rule", Method::PUT, &url, Some(&body))
            .await
    }

    async fn delete_rule(&self, policy_id: &str, rule_id: &str) -> ApiResult<()> {
        let url = self.rule_url(policy_id, rule_id);
        self.send("delete_rule", Method::DELETE, &url, None).await?;
        Ok(())
    }

    async fn activate_rule(&self, policy_id: &str, rule_id: &str) -> ApiResult<()> {
        let url = format!("{}/lifecycle/activate", self.rule_url(policy_id, rule_id));
        self.send("activate_rule", Method::POST, &url, None).await?;
        Ok(())
    }

    async fn deactivate_rule(&self, policy_id: &str, rule_id: &str) -> ApiResult<()> {
        let url = format!("{}/lifecycle/deactivate", self.rule_url(policy_id, rule_id));
        self.send("deactivate_rule", Method::POST, &url, None).await?;
        Ok(())
    }
}
