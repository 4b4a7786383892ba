//! # okta-client
//!
//! Rate-limited client for the Okta management API, scoped to policy rules.
//!
//! ## Modules
//!
//! - [`client`] - [`OktaClient`], bounded concurrency and the request path
//! - [`retry`] - backoff policy for HTTP 429 responses
//! - [`models`] - wire representation of IdP discovery rules
//! - [`traits`] - [`PolicyRuleApi`], the seam the reconciler is written against
//! - [`error`] - response classification into [`ApiError`]

pub mod client;
pub mod error;
pub mod models;
pub mod retry;
pub mod traits;

pub use client::{ClientConfig, OktaClient};
pub use error::{ApiError, ApiResult};
pub use models::{
    AppCondition, IdpAction, IdpDiscoveryRule, IdpProvider, NetworkCondition, PlatformCondition,
    PlatformInclude, PlatformOs, RuleActions, RuleConditions, UserIdentifierCondition,
    UserIdentifierPattern,
};
pub use retry::{MAX_RETRIES_CEILING, RetryPolicy};
pub use traits::PolicyRuleApi;
pub use tokio_util::sync::CancellationToken;
