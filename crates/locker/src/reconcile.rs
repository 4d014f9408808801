//! Merge local and catalog entries into one view keyed by universal id

use crate::entry::LockerEntry;
use indexmap::IndexMap;
use indexmap::map::Entry;
use uuid::Uuid;

/// Merge `local` (Locker and System provenance) with `store` candidates.
///
/// Local entries come first, ordered by their locker order. A store
/// candidate whose uuid is already present only backfills missing display
/// fields; otherwise it is appended in arrival order. The first store
/// candidate for a uuid wins over later ones.
#[must_use]
pub fn reconcile(local: Vec<LockerEntry>, store: Vec<LockerEntry>) -> Vec<LockerEntry> {
    let mut local = local;
    local.sort_by_key(|e| e.provenance.order().unwrap_or(i32::MAX));

    let mut merged: IndexMap<Uuid, LockerEntry> = IndexMap::with_capacity(local.len() + store.len());
    for entry in local {
        if let Some(previous) = merged.insert(entry.uuid, entry) {
            tracing::debug!(uuid = %previous.uuid, "duplicate local locker entry, keeping the later one");
        }
    }

    for candidate in store {
        match merged.entry(candidate.uuid) {
            Entry::Occupied(mut existing) => {
                if existing.get().provenance.is_local() {
                    existing.get_mut().backfill_from(&candidate);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
        }
    }

    merged.into_values().collect()
}
