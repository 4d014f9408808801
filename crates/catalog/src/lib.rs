//! Catalog access for appstore
//!
//! - [`SourceClient`]: fetches apps, home bundles, categories, collections
//!   and search results from one source through the disk cache
//! - [`Aggregator`]: runs a request against every source concurrently
//! - [`HttpTransport`] and [`SearchIndex`]: the network seams

#![expect(
    clippy::missing_errors_doc,
    reason = "fallible functions return the crate Error, documented on the type"
)]

pub mod aggregator;
mod categories;
pub mod client;
mod error;
pub mod http;
pub mod search;

pub use aggregator::Aggregator;
pub use categories::default_categories;
pub use client::{AccountApp, BULK_CHUNK_SIZE, CatalogContext, CollectionPage, SourceClient};
pub use error::{Error, Result};
pub use http::{HttpTransport, StaticToken, TokenProvider};
pub use search::{AlgoliaSearch, SearchIndex};
