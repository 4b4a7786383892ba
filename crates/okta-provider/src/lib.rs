//! # okta-provider
//!
//! Declarative management of Okta IdP discovery policy rules.
//!
//! The host hands each resource instance over as [`ResourceData`]: an
//! optional remote id plus a schema-checked [`FlatState`]. Hooks on a
//! [`ResourceHandler`] turn that flat state into API payloads, write them
//! through an [`okta_client::PolicyRuleApi`], reconcile activation status and
//! flatten the server's answer back.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use okta_client::OktaClient;
//! use okta_provider::{ProviderConfig, ResourceRegistry, ResourceData, FlatState};
//!
//! let config = okta_provider::config::loader::load_config(None)?;
//! let api = Arc::new(OktaClient::new(config.client_config()?)?);
//! let registry = ResourceRegistry::with_defaults(api);
//!
//! let handler = registry.get("okta_policy_rule_idp_discovery")?;
//! let mut data = handler.import("00p1/0pr1").await?;
//! handler.update(&mut data).await?;
//! ```

pub mod config;
pub mod error;
pub mod import;
pub mod observability;
pub mod reconcile;
pub mod registry;
pub mod resource;
pub mod resources;
pub mod schema;
pub mod state;

pub use config::{LoggingConfig, ProviderConfig};
pub use error::{ConfigError, ProviderError, ProviderResult, SchemaError};
pub use import::ImportId;
pub use reconcile::{StatusAction, reconcile_status};
pub use registry::ResourceRegistry;
pub use resource::ResourceHandler;
pub use resources::IdpDiscoveryRuleResource;
pub use schema::{FieldSchema, Kind, RecordField, ResourceSchema, Shape};
pub use state::{FieldValue, FlatState, Primitive, Record, ResourceData};
