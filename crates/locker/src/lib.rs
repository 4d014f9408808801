//! Locker views for appstore
//!
//! Merges the local locker, the remote account locker and catalog entries
//! into one list per app type, deduplicated by universal id and annotated
//! with compatibility for the target watch.

#![expect(
    clippy::missing_errors_doc,
    reason = "fallible functions return the crate Error, documented on the type"
)]

pub mod entry;
mod error;
pub mod reconcile;
pub mod resolver;
pub mod store;

pub use entry::{LockerEntry, Provenance};
pub use error::{Error, Result};
pub use reconcile::reconcile;
pub use resolver::{LockerQuery, LockerResolver};
pub use store::{AccountLocker, LockerStore, MemoryAccountLocker, MemoryLocker};
