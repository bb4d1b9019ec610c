// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Case-insensitive option maps
//!
//! Headers and transport options are both keyed by names whose casing is
//! not significant. [`OptionMap`] keeps insertion order and the casing the
//! caller used, while treating `Content-Type` and `content-type` as the
//! same key.

/// Insertion-ordered map with case-insensitive key identity
#[derive(Debug, Clone, PartialEq)]
pub struct OptionMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OptionMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> OptionMap<V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))
    }

    /// Insert a value, replacing any entry with the same key in any casing.
    ///
    /// The replaced entry keeps its position but takes the new casing.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.position(&key) {
            Some(idx) => self.entries[idx] = (key, value),
            None => self.entries.push((key, value)),
        }
    }

    /// Get a value by key, ignoring case
    pub fn get(&self, key: &str) -> Option<&V> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    /// Get a mutable value by key, ignoring case
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        match self.position(key) {
            Some(idx) => Some(&mut self.entries[idx].1),
            None => None,
        }
    }

    /// Check for a key, ignoring case
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Remove a key, ignoring case
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.position(key).map(|idx| self.entries.remove(idx).1)
    }

    /// Stored casing of a key
    pub fn key_casing(&self, key: &str) -> Option<&str> {
        self.position(key).map(|idx| self.entries[idx].0.as_str())
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> OptionMap<V> {
    /// Merge `overrides` on top of `self`.
    ///
    /// See [`merge`].
    pub fn merged_with(&self, overrides: &OptionMap<V>) -> OptionMap<V> {
        merge(self, overrides)
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OptionMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OptionMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<K: Into<String>, V> Extend<(K, V)> for OptionMap<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<V> IntoIterator for OptionMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Merge two maps, letting `overrides` win on keys that match case-insensitively.
///
/// Every `base` entry whose key also appears in `overrides` is dropped. The
/// result holds the surviving `base` entries in order, followed by every
/// `overrides` entry with its original casing.
pub fn merge<V: Clone>(base: &OptionMap<V>, overrides: &OptionMap<V>) -> OptionMap<V> {
    let mut entries: Vec<(String, V)> = base
        .entries
        .iter()
        .filter(|(k, _)| !overrides.contains_key(k))
        .cloned()
        .collect();
    entries.extend(overrides.entries.iter().cloned());
    OptionMap { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> OptionMap<String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_insert_is_case_insensitive() {
        let mut headers = map(&[("Accept", "text/html"), ("X-Trace", "1")]);
        headers.insert("accept", "application/json".to_string());

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("ACCEPT").map(String::as_str), Some("application/json"));
        assert_eq!(headers.key_casing("Accept"), Some("accept"));
        assert_eq!(headers.iter().next().map(|(k, _)| k), Some("accept"));
    }

    #[test]
    fn test_merge_override_wins_with_its_casing() {
        let base = map(&[("Content-Type", "text/plain"), ("X-Base", "b")]);
        let overrides = map(&[("content-type", "application/json")]);

        let merged = merge(&base, &overrides);

        assert_eq!(merged.len(), 2);
        let content_types: Vec<_> = merged
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(content_types[0].0, "content-type");
        assert_eq!(content_types[0].1, "application/json");
    }

    #[test]
    fn test_merge_keeps_order() {
        let base = map(&[("a", "1"), ("B", "2"), ("c", "3")]);
        let overrides = map(&[("b", "20"), ("d", "4")]);

        let keys: Vec<_> = merge(&base, &overrides)
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();

        assert_eq!(keys, vec!["a=1", "c=3", "b=20", "d=4"]);
    }

    #[test]
    fn test_merge_empty_inputs() {
        let empty: OptionMap<String> = OptionMap::new();
        let base = map(&[("x", "1")]);

        assert_eq!(merge(&empty, &empty).len(), 0);
        assert_eq!(merge(&base, &empty), base);
        assert_eq!(merge(&empty, &base), base);
    }

    #[test]
    fn test_remove() {
        let mut headers = map(&[("Cookie", "a=b")]);
        assert_eq!(headers.remove("cookie"), Some("a=b".to_string()));
        assert!(headers.is_empty());
    }
}
