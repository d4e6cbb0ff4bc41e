//! Flat `"section/key"` mapping used by the unstructured codec.
//!
//! [`ConfigMap`] wraps an [`IndexMap`] so decoded entries keep document order.
//! Encoding does not depend on that order: sections and keys are sorted
//! before rendering.
//!
//! ## Examples
//!
//! ```rust
//! use lvmconf::{ConfigMap, Value};
//!
//! let mut map = ConfigMap::new();
//! map.insert("global/umask".to_string(), Value::from(63));
//! map.insert("config/profile_dir".to_string(), Value::from("/etc/lvm/profile"));
//!
//! assert_eq!(map.get_in("global", "umask").and_then(Value::as_i64), Some(63));
//! let keys: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(keys, vec!["global/umask", "config/profile_dir"]);
//! ```

use crate::Value;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Separator between the section and field halves of a key.
pub const KEY_SEPARATOR: char = '/';

/// Ordered map of `"section/key"` strings to decoded values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigMap(IndexMap<String, Value>);

impl ConfigMap {
    #[must_use]
    pub fn new() -> Self {
        ConfigMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ConfigMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the old value is returned and
    /// the key keeps its original position.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Looks up `section/field`.
    #[must_use]
    pub fn get_in(&self, section: &str, field: &str) -> Option<&Value> {
        self.0
            .get(format!("{}{}{}", section, KEY_SEPARATOR, field).as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries of one section as `(field, value)`, in map order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lvmconf::config_map;
    ///
    /// let map = config_map! {
    ///     "devices/dir" => "/dev",
    ///     "global/umask" => 63,
    ///     "devices/scan" => "/dev",
    /// };
    /// let fields: Vec<_> = map.section("devices").map(|(f, _)| f).collect();
    /// assert_eq!(fields, vec!["dir", "scan"]);
    /// ```
    pub fn section<'a>(&'a self, name: &'a str) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.0.iter().filter_map(move |(key, value)| {
            let (section, field) = key.split_once(KEY_SEPARATOR)?;
            (section == name).then_some((field, value))
        })
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl Default for ConfigMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for ConfigMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl From<HashMap<String, Value>> for ConfigMap {
    fn from(map: HashMap<String, Value>) -> Self {
        ConfigMap(map.into_iter().collect())
    }
}

impl From<ConfigMap> for HashMap<String, Value> {
    fn from(map: ConfigMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for ConfigMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConfigMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for ConfigMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        ConfigMap(IndexMap::from_iter(iter))
    }
}

impl Extend<(String, Value)> for ConfigMap {
    fn extend<T: IntoIterator<Item = (String, Value)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_position() {
        let mut map = ConfigMap::new();
        map.insert("b/x".to_string(), Value::from(1));
        map.insert("a/y".to_string(), Value::from(2));
        assert_eq!(map.insert("b/x".to_string(), Value::from(3)), Some(Value::from(1)));
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["b/x", "a/y"]);
    }

    #[test]
    fn test_section_filter_ignores_bare_keys() {
        let map: ConfigMap = vec![
            ("use_lvmetad".to_string(), Value::from(0)),
            ("global/umask".to_string(), Value::from(63)),
        ]
        .into_iter()
        .collect();
        let global: Vec<_> = map.section("global").collect();
        assert_eq!(global, vec![("umask", &Value::from(63))]);
        assert_eq!(map.get("use_lvmetad"), Some(&Value::from(0)));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut map: ConfigMap = (0..3)
            .map(|i| (format!("s/k{}", i), Value::from(i)))
            .collect();
        assert_eq!(map.remove("s/k1"), Some(Value::from(1)));
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["s/k0", "s/k2"]);
    }

    #[test]
    fn test_serialize_as_json_object() {
        let mut map = ConfigMap::new();
        map.insert("config/some_field".to_string(), Value::from(1));
        map.insert("config/profile_dir".to_string(), Value::from("/p"));
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"config/some_field":1,"config/profile_dir":"/p"}"#);
    }
}
