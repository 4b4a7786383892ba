//! `okta_policy_rule_idp_discovery`: routes users to an identity provider.
//!
//! Every write is two-phase: the rule object first, then its activation
//! status (see [`crate::reconcile`]). Both create and update finish by
//! reading the rule back so the state reflects the server.

pub mod schema;
pub mod transcode;

use std::sync::Arc;

use async_trait::async_trait;
use okta_client::PolicyRuleApi;
use tracing::{debug, info, instrument};

use crate::error::{ProviderError, ProviderResult};
use crate::import::ImportId;
use crate::reconcile::reconcile_status;
use crate::resource::ResourceHandler;
use crate::schema::ResourceSchema;
use crate::state::{FieldValue, ResourceData};

pub use schema::{SCHEMA, TYPE_NAME};
pub use transcode::{build, flatten};

/// Handler for IdP discovery policy rules.
#[derive(Clone)]
pub struct IdpDiscoveryRuleResource {
    api: Arc<dyn PolicyRuleApi>,
}

impl IdpDiscoveryRuleResource {
    #[must_use]
    pub fn new(api: Arc<dyn PolicyRuleApi>) -> Self {
        Self { api }
    }
}

fn policy_id(data: &ResourceData) -> ProviderResult<String> {
    data.state
        .get_str(schema::POLICY_ID)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ProviderError::missing_id(schema::POLICY_ID))
}

fn rule_id(data: &ResourceData) -> ProviderResult<String> {
    data.id()
        .map(str::to_string)
        .ok_or_else(|| ProviderError::missing_id("rule id"))
}

fn desired_status(data: &ResourceData) -> String {
    data.state
        .get_str(schema::STATUS)
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl ResourceHandler for IdpDiscoveryRuleResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &'static ResourceSchema {
        &SCHEMA
    }

    async fn exists(&self, data: &ResourceData) -> ProviderResult<bool> {
        let Some(rule_id) = data.id() else {
            return Ok(false);
        };
        let policy_id = policy_id(data)?;

        match self.api.get_rule(&policy_id, rule_id).await {
            Ok(rule) => Ok(rule.rule_id().is_some()),
            Err(err) if err.is_not_found() => {
                debug!(%policy_id, rule_id, "Rule no longer exists");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self, data))]
    async fn create(&self, data: &mut ResourceData) -> ProviderResult<()> {
        let policy_id = policy_id(data)?;
        let desired = desired_status(data);

        let payload = build(&data.state);
        // A 404 here names the policy, not a rule.
        let created = self
            .api
            .create_rule(&policy_id, &payload)
            .await
            .map_err(ProviderError::from)?;
        let rule_id = created
            .rule_id()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::missing_id("rule id in create response"))?;

        data.id = Some(rule_id.clone());
        data.state.merge(flatten(&created));
        info!(%policy_id, %rule_id, "Rule created");

        reconcile_status(
            self.api.as_ref(),
            &policy_id,
            &rule_id,
            &desired,
            created.status.as_deref(),
        )
        .await?;

        self.read(data).await
    }

    async fn read(&self, data: &mut ResourceData) -> ProviderResult<()> {
        let policy_id = policy_id(data)?;
        let rule_id = rule_id(data)?;

        let rule = self
            .api
            .get_rule(&policy_id, &rule_id)
            .await
            .map_err(|err| ProviderError::from_api(err, &rule_id))?;

        data.state.merge(flatten(&rule));
        debug!(%policy_id, %rule_id, "Rule read");
        Ok(())
    }

    #[instrument(skip(self, data), fields(rule_id = data.id().unwrap_or_default()))]
    async fn update(&self, data: &mut ResourceData) -> ProviderResult<()> {
        let policy_id = policy_id(data)?;
        let rule_id = rule_id(data)?;
        let desired = desired_status(data);

        let payload = build(&data.state);
        let updated = self
            .api
            .update_rule(&policy_id, &rule_id, &payload)
            .await
            .map_err(|err| ProviderError::from_api(err, &rule_id))?;
        data.state.merge(flatten(&updated));
        info!(%policy_id, %rule_id, "Rule updated");

        reconcile_status(
            self.api.as_ref(),
            &policy_id,
            &rule_id,
            &desired,
            updated.status.as_deref(),
        )
        .await?;

        self.read(data).await
    }

    async fn delete(&self, data: &mut ResourceData) -> ProviderResult<()> {
        let policy_id = policy_id(data)?;
        let rule_id = rule_id(data)?;

        match self.api.delete_rule(&policy_id, &rule_id).await {
            Ok(()) => info!(%policy_id, %rule_id, "Rule deleted"),
            Err(err) if err.is_not_found() => {
                debug!(%policy_id, %rule_id, "Rule already gone");
            }
            Err(err) => return Err(err.into()),
        }
        data.id = None;
        Ok(())
    }

    async fn import(&self, import_id: &str) -> ProviderResult<ResourceData> {
        let ImportId { policy_id, rule_id } = import_id.parse()?;

        let mut data = ResourceData::new(&SCHEMA).with_id(rule_id);
        data.state
            .set(schema::POLICY_ID, FieldValue::from(policy_id))?;
        self.read(&mut data).await?;
        Ok(data)
    }
}
