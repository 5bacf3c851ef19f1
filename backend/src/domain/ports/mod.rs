//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod cache_key;
mod cache_store;
mod platform_adapter;

pub use cache_key::{
    CacheKey, CacheKeyValidationError, CacheNamespace, UnknownCacheNamespaceError,
};
#[cfg(test)]
pub use cache_store::MockCacheStore;
pub use cache_store::{CacheStore, CacheStoreError};
#[cfg(test)]
pub use platform_adapter::MockPlatformAdapter;
pub use platform_adapter::{PlatformAdapter, PlatformAdapterError};
