//! Deterministic cache keys for catalog requests
//!
//! A fingerprint identifies one cacheable request: the catalog source, the
//! entity being requested and the query parameters sent with it. Parameters
//! are canonicalized (sorted by key, rendered as `key=value`, joined with `&`)
//! so that insertion order never changes the key.

use sha2::{Digest, Sha256};
use std::fmt;

/// Separates the three key components so `("ab", "c")` and `("a", "bc")`
/// hash differently.
const COMPONENT_SEPARATOR: u8 = 0x1f;

/// A content-addressed cache key (SHA-256 of the canonical request)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Compute the fingerprint of a request.
    ///
    /// `params` may be any map or list of pairs; ordering is irrelevant.
    #[must_use]
    pub fn compute<I, K, V>(source: &str, entity: &str, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let canonical = canonical_parameters(params);
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update([COMPONENT_SEPARATOR]);
        hasher.update(entity.as_bytes());
        hasher.update([COMPONENT_SEPARATOR]);
        hasher.update(canonical.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Raw digest bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering, used as the cache file stem
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// File name of the cache entry for this key
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.json", self.to_hex())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Render parameters as `k1=v1&k2=v2` sorted by key (then value).
#[must_use]
pub fn canonical_parameters<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(String, String)> = params
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};

    const SOURCE: &str = "https://appstore-api.example.com/api";

    fn no_params() -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    #[test]
    fn canonical_parameters_sorts_by_key() {
        let rendered = canonical_parameters([("platform", "android"), ("hardware", "basalt")]);
        assert_eq!(rendered, "hardware=basalt&platform=android");
    }

    #[test]
    fn canonical_parameters_empty() {
        assert_eq!(canonical_parameters(no_params()), "");
    }

    #[test]
    fn fingerprint_ignores_insertion_order() {
        let a = Fingerprint::compute(
            SOURCE,
            "app-1",
            [("platform", "ios"), ("hardware", "emery"), ("filter_hardware", "true")],
        );
        let b = Fingerprint::compute(
            SOURCE,
            "app-1",
            [("filter_hardware", "true"), ("platform", "ios"), ("hardware", "emery")],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_same_for_hashmap_and_btreemap() {
        let mut hashed = HashMap::new();
        hashed.insert("platform".to_string(), "android".to_string());
        hashed.insert("hardware".to_string(), "chalk".to_string());
        let ordered: BTreeMap<_, _> = hashed.clone().into_iter().collect();

        assert_eq!(
            Fingerprint::compute(SOURCE, "x", &hashed),
            Fingerprint::compute(SOURCE, "x", &ordered)
        );
    }

    #[test]
    fn fingerprint_changes_with_source() {
        let a = Fingerprint::compute(SOURCE, "app-1", no_params());
        let b = Fingerprint::compute("https://other.example.com/api", "app-1", no_params());
        assert_ne!(a, b);
    }

    #[test]
    fn fingerprint_changes_with_entity() {
        let a = Fingerprint::compute(SOURCE, "app-1", no_params());
        let b = Fingerprint::compute(SOURCE, "app-2", no_params());
        assert_ne!(a, b);
    }

    #[test]
    fn fingerprint_changes_with_parameter_value() {
        let a = Fingerprint::compute(SOURCE, "app-1", [("hardware", "basalt")]);
        let b = Fingerprint::compute(SOURCE, "app-1", [("hardware", "diorite")]);
        assert_ne!(a, b);
    }

    #[test]
    fn fingerprint_component_boundaries_matter() {
        let a = Fingerprint::compute("ab", "c", no_params());
        let b = Fingerprint::compute("a", "bc", no_params());
        assert_ne!(a, b);
    }

    #[test]
    fn fingerprint_hex_is_stable() {
        let key = Fingerprint::compute(SOURCE, "app-1", no_params());
        let hex = key.to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key.file_name(), format!("{hex}.json"));
        assert_eq!(key.to_string(), hex);
    }
}
