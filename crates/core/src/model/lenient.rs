//! Schema-tolerant decoding helpers
//!
//! Remote catalogs drift: fields go missing, come back as `null`, or change
//! shape. Wire types combine a container-level `#[serde(default)]` (missing
//! fields) with [`null_as_default`] (explicit nulls) so that one odd field
//! never rejects a whole payload. Unknown fields are ignored by serde's
//! default behaviour.

use serde::{Deserialize, Deserializer};

/// Deserialize `null` as `T::default()`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
