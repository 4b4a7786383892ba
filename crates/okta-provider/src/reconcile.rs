//! Activation status as a second write phase.
//!
//! The rule endpoints accept `status` in the payload but the lifecycle of a
//! rule is only changed through the activate/deactivate calls. After every
//! create or update the desired status is compared with what the write
//! returned and at most one lifecycle call is made.

use okta_client::PolicyRuleApi;
use okta_client::models::{STATUS_ACTIVE, STATUS_INACTIVE};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};

/// Lifecycle call needed to reach the desired status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    None,
    Activate,
    Deactivate,
}

impl StatusAction {
    /// Decides the lifecycle call from the desired and observed statuses.
    ///
    /// Only a difference triggers a call; an unknown desired status is left
    /// alone.
    #[must_use]
    pub fn plan(desired: &str, observed: Option<&str>) -> Self {
        if observed == Some(desired) {
            return Self::None;
        }
        match desired {
            STATUS_ACTIVE => Self::Activate,
            STATUS_INACTIVE => Self::Deactivate,
            _ => Self::None,
        }
    }
}

/// Applies the desired status to an already written rule.
///
/// A failing lifecycle call is reported as
/// [`ProviderError::PartialReconciliation`]: the rule exists under `rule_id`
/// but its status is not what was asked for.
pub async fn reconcile_status(
    api: &dyn PolicyRuleApi,
    policy_id: &str,
    rule_id: &str,
    desired: &str,
    observed: Option<&str>,
) -> ProviderResult<StatusAction> {
    let action = StatusAction::plan(desired, observed);
    let result = match action {
        StatusAction::None => {
            debug!(policy_id, rule_id, status = desired, "Status already as desired");
            return Ok(action);
        }
        StatusAction::Activate => api.activate_rule(policy_id, rule_id).await,
        StatusAction::Deactivate => api.deactivate_rule(policy_id, rule_id).await,
    };

    match result {
        Ok(()) => {
            info!(policy_id, rule_id, status = desired, "Rule status updated");
            Ok(action)
        }
        Err(source) => Err(ProviderError::PartialReconciliation {
            id: rule_id.to_string(),
            desired: desired.to_string(),
            source,
        }),
    }
}
