//! Composite cache keys.

use std::fmt;

use crate::constants::KEY_SEPARATOR;

/// A `(namespace, raw_key)` pair.
///
/// The derived form (`namespace-raw_key`) is computed once and used verbatim at
/// every tier, so a record is addressable by the same string everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace_len: usize,
    derived: String,
}

impl CacheKey {
    pub fn new(namespace: &str, raw_key: &str) -> Self {
        let mut derived = String::with_capacity(namespace.len() + 1 + raw_key.len());
        derived.push_str(namespace);
        derived.push(KEY_SEPARATOR);
        derived.push_str(raw_key);

        Self {
            namespace_len: namespace.len(),
            derived,
        }
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        &self.derived[..self.namespace_len]
    }

    /// The caller-supplied part of the key.
    #[inline]
    pub fn raw(&self) -> &str {
        &self.derived[self.namespace_len + KEY_SEPARATOR.len_utf8()..]
    }

    /// The tier-level key: `namespace-raw_key`.
    #[inline]
    pub fn derived(&self) -> &str {
        &self.derived
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_key_format() {
        let key = CacheKey::new("country", "Italy");

        assert_eq!(key.derived(), "country-Italy");
        assert_eq!(key.namespace(), "country");
        assert_eq!(key.raw(), "Italy");
        assert_eq!(key.to_string(), "country-Italy");
    }

    #[test]
    fn test_raw_key_may_contain_separator() {
        let key = CacheKey::new("name", "Jean-Luc");

        assert_eq!(key.derived(), "name-Jean-Luc");
        assert_eq!(key.namespace(), "name");
        assert_eq!(key.raw(), "Jean-Luc");
    }

    #[test]
    fn test_empty_raw_key() {
        let key = CacheKey::new("age", "");

        assert_eq!(key.derived(), "age-");
        assert_eq!(key.raw(), "");
    }

    #[test]
    fn test_same_inputs_same_key() {
        assert_eq!(CacheKey::new("age", "42"), CacheKey::new("age", "42"));
        assert_ne!(CacheKey::new("age", "42"), CacheKey::new("naid", "42"));
    }
}
