//! Ordered map type for TDF objects.
//!
//! This module provides [`TdfMap`], a wrapper around [`IndexMap`] that keeps object
//! entries in insertion order. Order is significant in TDF: both codecs write entries
//! in the order they were inserted, and the polymorphism tag is only recognised when
//! it is the **first** entry of an object.
//!
//! ## Examples
//!
//! ```rust
//! use serde_tdf::{TdfMap, Value};
//!
//! let mut map = TdfMap::new();
//! map.insert("name".to_string(), Value::from("Slime"));
//! map.insert("health".to_string(), Value::from(3u8));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Slime"));
//! ```

use indexmap::IndexMap;
use std::collections::HashMap;
use std::ops::Index;

use crate::Value;

/// Prefix reserved for the polymorphism tag key.
pub const TYPE_TAG_PREFIX: char = '!';

/// An ordered map of unique string keys to TDF values.
///
/// # Examples
///
/// ```rust
/// use serde_tdf::{TdfMap, Value};
///
/// let mut map = TdfMap::new();
/// map.insert("first".to_string(), Value::from(1));
/// map.insert("second".to_string(), Value::from(2));
///
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TdfMap(IndexMap<String, Value>);

impl TdfMap {
    /// Creates an empty `TdfMap`.
    #[must_use]
    pub fn new() -> Self {
        TdfMap(IndexMap::new())
    }

    /// Creates an empty `TdfMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        TdfMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the old value is returned and the key
    /// keeps its original position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_tdf::{TdfMap, Value};
    ///
    /// let mut map = TdfMap::new();
    /// assert!(map.insert("key".to_string(), Value::from(42)).is_none());
    /// assert!(map.insert("key".to_string(), Value::from(43)).is_some());
    /// ```
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Returns `true` if the map contains the key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a key, shifting later entries down so that order is preserved.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Returns the first entry in insertion order.
    #[must_use]
    pub fn first(&self) -> Option<(&String, &Value)> {
        self.0.first()
    }

    /// Returns the polymorphism tag of this object, if present.
    ///
    /// Only the **first** entry is inspected. A `!`-prefixed key found anywhere else is
    /// ignored, exactly as the decoder ignores it. The returned pair is the module
    /// identifier (prefix stripped) and the value carrying the full type name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_tdf::{TdfMap, Value};
    ///
    /// let mut map = TdfMap::new();
    /// map.insert("!game".to_string(), Value::from("game::Slime"));
    /// map.insert("health".to_string(), Value::from(3u8));
    ///
    /// let (module, name) = map.type_tag().unwrap();
    /// assert_eq!(module, "game");
    /// assert_eq!(name.as_str(), Some("game::Slime"));
    /// ```
    #[must_use]
    pub fn type_tag(&self) -> Option<(&str, &Value)> {
        self.first()
            .and_then(|(key, value)| key.strip_prefix(TYPE_TAG_PREFIX).map(|m| (m, value)))
    }

    /// Returns the number of elements in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl From<HashMap<String, Value>> for TdfMap {
    fn from(map: HashMap<String, Value>) -> Self {
        TdfMap(map.into_iter().collect())
    }
}

impl From<TdfMap> for HashMap<String, Value> {
    fn from(map: TdfMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for TdfMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TdfMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for TdfMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        TdfMap(IndexMap::from_iter(iter))
    }
}

/// Panics if the key is absent.
impl Index<&str> for TdfMap {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        &self.0[key]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tag_only_first_entry() {
        let mut map = TdfMap::new();
        map.insert("health".to_string(), Value::from(3u8));
        map.insert("!game".to_string(), Value::from("game::Slime"));

        // A tag in any position but the first is not a tag.
        assert!(map.type_tag().is_none());
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut map: TdfMap = vec![
            ("a".to_string(), Value::from(1)),
            ("b".to_string(), Value::from(2)),
            ("c".to_string(), Value::from(3)),
        ]
        .into_iter()
        .collect();

        map.remove("b");
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_duplicate_insert_keeps_position() {
        let mut map = TdfMap::new();
        map.insert("a".to_string(), Value::from(1));
        map.insert("b".to_string(), Value::from(2));
        map.insert("a".to_string(), Value::from(9));

        assert_eq!(map.first().map(|(k, v)| (k.as_str(), v.clone())), Some(("a", Value::Int(9))));
    }
}
