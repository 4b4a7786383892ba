//! Trait seam between the reconciler and the remote API.

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::IdpDiscoveryRule;

/// Policy rule operations the reconciler depends on.
///
/// [`crate::OktaClient`] talks to the real API; tests substitute recording
/// fakes. Implementations classify failures into [`crate::ApiError`] so that
/// callers can tell "not found" and "rate limited" apart from anything else.
#[async_trait]
pub trait PolicyRuleApi: Send + Sync {
    /// Fetches a rule by id.
    async fn get_rule(&self, policy_id: &str, rule_id: &str) -> ApiResult<IdpDiscoveryRule>;

    /// Creates a rule under a policy and returns the stored representation.
    async fn create_rule(
        &self,
        policy_id: &str,
        rule: &IdpDiscoveryRule,
    ) -> ApiResult<IdpDiscoveryRule>;

    /// Replaces a rule in place, keeping its id.
    async fn update_rule(
        &self,
        policy_id: &str,
        rule_id: &str,
        rule: &IdpDiscoveryRule,
    ) -> ApiResult<IdpDiscoveryRule>;

    /// Deletes a rule.
    async fn delete_rule(&self, policy_id: &str, rule_id: &str) -> ApiResult<()>;

    /// Activates a rule. The rule must already exist.
    async fn activate_rule(&self, policy_id: &str, rule_id: &str) -> ApiResult<()>;

    /// Deactivates a rule. The rule must already exist.
    async fn deactivate_rule(&self, policy_id: &str, rule_id: &str) -> ApiResult<()>;
}
