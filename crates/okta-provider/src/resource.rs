//! The hook interface a host drives resources through.

use async_trait::async_trait;

use crate::error::ProviderResult;
use crate::schema::ResourceSchema;
use crate::state::ResourceData;

/// Lifecycle hooks of one resource type.
///
/// The host owns diffing and decides which hook to call. Hooks run one
/// resource at a time and leave `data` describing the remote object as last
/// observed.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Name the resource type is registered under.
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> &'static ResourceSchema;

    /// Whether the object identified by `data` still exists remotely.
    ///
    /// Returns `Ok(false)` when it is gone or no id has been captured.
    async fn exists(&self, data: &ResourceData) -> ProviderResult<bool>;

    /// Creates the object and records its identifier in `data`.
    async fn create(&self, data: &mut ResourceData) -> ProviderResult<()>;

    /// Refreshes `data` from the remote object.
    async fn read(&self, data: &mut ResourceData) -> ProviderResult<()>;

    /// Writes `data` over the existing object, keeping its identifier.
    async fn update(&self, data: &mut ResourceData) -> ProviderResult<()>;

    /// Deletes the object. Deleting an object that is already gone succeeds.
    async fn delete(&self, data: &mut ResourceData) -> ProviderResult<()>;

    /// Adopts an existing object from its import identifier.
    async fn import(&self, import_id: &str) -> ProviderResult<ResourceData>;
}
