//! In-memory `PolicyRuleApi` that records every call.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use okta_client::models::IdpDiscoveryRule;
use okta_client::{ApiError, ApiResult, PolicyRuleApi};
use okta_provider::resources::idp_discovery::SCHEMA;
use okta_provider::{FlatState, ResourceData};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get(String),
    Create(String),
    Update(String),
    Delete(String),
    Activate(String),
    Deactivate(String),
}

#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<Call>>,
    rules: Mutex<BTreeMap<String, IdpDiscoveryRule>>,
    next_id: AtomicU32,
    /// Status the server stores on every write, ignoring the payload.
    pub write_status: Mutex<Option<String>>,
    pub fail_lifecycle: Mutex<Option<ApiError>>,
    pub fail_write: Mutex<Option<ApiError>>,
    pub fail_read: Mutex<Option<ApiError>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_write_status(self, status: &str) -> Self {
        *self.write_status.lock().unwrap() = Some(status.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn stored(&self, rule_id: &str) -> Option<IdpDiscoveryRule> {
        self.rules.lock().unwrap().get(rule_id).cloned()
    }

    pub fn insert(&self, rule: IdpDiscoveryRule) {
        let id = rule.id.clone().unwrap();
        self.rules.lock().unwrap().insert(id, rule);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn store(&self, id: String, rule: &IdpDiscoveryRule) -> IdpDiscoveryRule {
        let mut stored = rule.clone();
        stored.id = Some(id.clone());
        stored.status = self
            .write_status
            .lock()
            .unwrap()
            .clone()
            .or(stored.status)
            .or_else(|| Some("ACTIVE".into()));
        stored.priority = stored.priority.or(Some(1));
        self.rules.lock().unwrap().insert(id, stored.clone());
        stored
    }

    fn set_status(&self, rule_id: &str, status: &str) -> ApiResult<()> {
        if let Some(err) = self.fail_lifecycle.lock().unwrap().clone() {
            return Err(err);
        }
        let mut rules = self.rules.lock().unwrap();
        let rule = rules
            .get_mut(rule_id)
            .ok_or_else(|| ApiError::not_found(rule_id))?;
        rule.status = Some(status.to_string());
        Ok(())
    }
}

#[async_trait]
impl PolicyRuleApi for FakeApi {
    async fn get_rule(&self, _policy_id: &str, rule_id: &str) -> ApiResult<IdpDiscoveryRule> {
        self.record(Call::Get(rule_id.to_string()));
        if let Some(err) = self.fail_read.lock().unwrap().clone() {
            return Err(err);
        }
        self.stored(rule_id)
            .ok_or_else(|| ApiError::not_found(rule_id))
    }

    async fn create_rule(
        &self,
        policy_id: &str,
        rule: &IdpDiscoveryRule,
    ) -> ApiResult<IdpDiscoveryRule> {
        self.record(Call::Create(policy_id.to_string()));
        if let Some(err) = self.fail_write.lock().unwrap().clone() {
            return Err(err);
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(self.store(format!("0pr{n}"), rule))
    }

    async fn update_rule(
        &self,
        _policy_id: &str,
        rule_id: &str,
        rule: &IdpDiscoveryRule,
    ) -> ApiResult<IdpDiscoveryRule> {
        self.record(Call::Update(rule_id.to_string()));
        if let Some(err) = self.fail_write.lock().unwrap().clone() {
            return Err(err);
        }
        if self.stored(rule_id).is_none() {
            return Err(ApiError::not_found(rule_id));
        }
        Ok(self.store(rule_id.to_string(), rule))
    }

    async fn delete_rule(&self, _policy_id: &str, rule_id: &str) -> ApiResult<()> {
        self.record(Call::Delete(rule_id.to_string()));
        self.rules
            .lock()
            .unwrap()
            .remove(rule_id)
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found(rule_id))
    }

    async fn activate_rule(&self, _policy_id: &str, rule_id: &str) -> ApiResult<()> {
        self.record(Call::Activate(rule_id.to_string()));
        self.set_status(rule_id, "ACTIVE")
    }

    async fn deactivate_rule(&self, _policy_id: &str, rule_id: &str) -> ApiResult<()> {
        self.record(Call::Deactivate(rule_id.to_string()));
        self.set_status(rule_id, "INACTIVE")
    }
}

/// Resource data for a desired state document.
pub fn desired(doc: Value) -> ResourceData {
    ResourceData::from_state(FlatState::from_config(&SCHEMA, &doc).unwrap())
}
