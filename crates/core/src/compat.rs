//! Compatibility resolution
//!
//! `is_compatible` asks whether the target family can run any variant the
//! entity ships. `is_natively_compatible` only carries information on
//! families that scale foreign binaries: there it is true when the entity
//! publishes a binary built for the target itself. An entity that publishes
//! no per-binary detail at all is treated as native.

use crate::model::{
    ClientPlatform, LocalLockerEntry, StoreApplication, StoreSearchResult, WatchPlatform,
};
use serde::{Deserialize, Serialize};

/// Outcome of resolving one entity against one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityResult {
    pub is_compatible: bool,
    pub is_natively_compatible: bool,
}

/// Anything that declares which hardware it supports
pub trait PlatformSupportInfo {
    /// Whether `target` can run the entity when driven from `client`
    fn runs_on(&self, target: WatchPlatform, client: ClientPlatform) -> bool;

    /// Whether a binary built for `target` exists; `None` when the entity
    /// does not report per-binary detail.
    fn has_native_binary(&self, target: WatchPlatform) -> Option<bool>;
}

/// Resolve `entity` for `target`. Pure.
pub fn resolve<E>(entity: &E, target: WatchPlatform, client: ClientPlatform) -> CompatibilityResult
where
    E: PlatformSupportInfo + ?Sized,
{
    let is_natively_compatible = if target.performs_scaling() {
        entity.has_native_binary(target).unwrap_or(true)
    } else {
        true
    };
    CompatibilityResult {
        is_compatible: entity.runs_on(target, client),
        is_natively_compatible,
    }
}

impl PlatformSupportInfo for StoreApplication {
    fn runs_on(&self, target: WatchPlatform, client: ClientPlatform) -> bool {
        self.compatibility.supports_client(client)
            && self
                .compatibility
                .supported_variants()
                .into_iter()
                .any(|variant| target.can_run(variant))
    }

    fn has_native_binary(&self, target: WatchPlatform) -> Option<bool> {
        self.hardware_platforms.as_ref().map(|binaries| {
            binaries.iter().any(|binary| {
                binary.name == target.codename() && binary.pebble_process_info_flags.is_some()
            })
        })
    }
}

impl PlatformSupportInfo for StoreSearchResult {
    fn runs_on(&self, target: WatchPlatform, client: ClientPlatform) -> bool {
        self.compatibility.supports_client(client)
            && self
                .compatibility
                .supported_variants()
                .into_iter()
                .any(|variant| target.can_run(variant))
    }

    // Search hits never carry binary detail
    fn has_native_binary(&self, _target: WatchPlatform) -> Option<bool> {
        None
    }
}

impl PlatformSupportInfo for LocalLockerEntry {
    fn runs_on(&self, target: WatchPlatform, _client: ClientPlatform) -> bool {
        self.find_compatible_platform(target).is_some()
    }

    fn has_native_binary(&self, target: WatchPlatform) -> Option<bool> {
        match self {
            Self::Normal { properties, .. } => Some(
                properties
                    .platforms
                    .iter()
                    .any(|p| p.watch_platform == target),
            ),
            Self::System { .. } => None,
        }
    }
}
