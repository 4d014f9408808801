//! Core types for the appstore catalog layer
//!
//! - [`model`]: catalog wire types, local locker entries, hardware families
//! - [`compat`]: native vs. scaled compatibility resolution
//! - [`sources`]: catalog sources, collections and the [`SourceRegistry`]
//! - [`config`]: layered configuration

// TODO(core-docs): Add # Errors documentation to all fallible public functions
#![expect(
    clippy::missing_errors_doc,
    reason = "Error documentation to be added incrementally"
)]

pub mod compat;
pub mod config;
mod error;
pub mod model;
pub mod sources;

pub use compat::{CompatibilityResult, PlatformSupportInfo, resolve};
pub use config::Config;
pub use error::{Error, Result};
pub use sources::SourceRegistry;
