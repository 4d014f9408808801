//! Catalog sources, their persistence and the registry over them

pub mod defaults;
pub mod model;
pub mod registry;
pub mod store;

pub use defaults::{
    ACCOUNT_SOURCE_URL, PRIMARY_SOURCE_URL, default_sources, is_account_source,
    is_primary_source,
};
pub use model::{AppstoreCollection, CatalogSource, NewCatalogSource, SearchCredentials, SourceId};
pub use registry::{SourceRegistry, collection_enabled_by_default};
pub use store::{CollectionStore, JsonFileStore, MemoryStore, SourceStore};
