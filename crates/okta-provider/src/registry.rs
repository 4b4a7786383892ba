//! Resource type name to handler lookup, built once at startup.

use std::collections::BTreeMap;
use std::sync::Arc;

use okta_client::PolicyRuleApi;

use crate::error::{ProviderError, ProviderResult};
use crate::resource::ResourceHandler;
use crate::resources::IdpDiscoveryRuleResource;

/// Handlers keyed by resource type name.
#[derive(Clone, Default)]
pub struct ResourceRegistry {
    handlers: BTreeMap<&'static str, Arc<dyn ResourceHandler>>,
}

impl ResourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every resource type this crate provides.
    #[must_use]
    pub fn with_defaults(api: Arc<dyn PolicyRuleApi>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(IdpDiscoveryRuleResource::new(api)));
        registry
    }

    /// Adds a handler, replacing any previous one with the same name.
    pub fn register(&mut self, handler: Arc<dyn ResourceHandler>) {
        self.handlers.insert(handler.type_name(), handler);
    }

    pub fn get(&self, type_name: &str) -> ProviderResult<Arc<dyn ResourceHandler>> {
        self.handlers
            .get(type_name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownResourceType {
                name: type_name.to_string(),
            })
    }

    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }
}
