//! Resource types served by the provider.

pub mod idp_discovery;

pub use idp_discovery::IdpDiscoveryRuleResource;

use crate::schema::ResourceSchema;

/// Schema of a resource type, available without an API client.
#[must_use]
pub fn schema_for(type_name: &str) -> Option<&'static ResourceSchema> {
    match type_name {
        idp_discovery::TYPE_NAME => Some(&idp_discovery::SCHEMA),
        _ => None,
    }
}
