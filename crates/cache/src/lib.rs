//! Content-addressed TTL disk cache for appstore catalog responses
//!
//! This crate provides the memoization layer under the catalog fetcher:
//! - Deterministic request fingerprints ([`Fingerprint`])
//! - A namespaced JSON store with per-namespace TTLs ([`DiskCache`])
//! - Cache root resolution with environment overrides ([`resolve_cache_root`])
//!
//! The cache is best-effort. Reads degrade to a miss and writes log their
//! failures instead of returning them.

mod error;
pub mod fingerprint;
mod root;
pub mod store;

pub use error::{Error, Result};

pub use fingerprint::{Fingerprint, canonical_parameters};
pub use root::{CACHE_DIR_ENV, resolve_cache_root};
pub use store::{
    CacheEntry, CachePolicies, CachePolicy, DEFAULT_APP_TTL, DEFAULT_CATEGORY_TTL,
    DEFAULT_HOME_TTL, DiskCache, Freshness, Namespace,
};
