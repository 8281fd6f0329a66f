//! Insertion-ordered variable mapping
//!
//! Build variables and build secrets are both plain `name -> string` maps whose
//! iteration order ends up in the generated build specification, so they must
//! keep the order they were written in. Re-inserting an existing key replaces
//! the value but keeps the key's original position.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedVars {
    entries: Vec<(String, String)>,
}

impl OrderedVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites `key`, returning the previous value if there was one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OrderedVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = OrderedVars::new();
        for (k, v) in iter {
            vars.insert(k, v);
        }
        vars
    }
}

impl Serialize for OrderedVars {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct OrderedVarsVisitor;

impl<'de> Visitor<'de> for OrderedVarsVisitor {
    type Value = OrderedVars;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of variable names to string values")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(OrderedVars::new())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut vars = OrderedVars::new();
        while let Some((key, value)) = access.next_entry::<String, String>()? {
            vars.insert(key, value);
        }
        Ok(vars)
    }
}

impl<'de> Deserialize<'de> for OrderedVars {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedVarsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_preserves_order() {
        let vars: OrderedVars = [("B", "1"), ("A", "2"), ("C", "3")].into_iter().collect();
        assert_eq!(vars.keys().collect::<Vec<_>>(), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut vars: OrderedVars = [("A", "1"), ("B", "2")].into_iter().collect();
        let previous = vars.insert("A", "3");

        assert_eq!(previous, Some("1".to_string()));
        assert_eq!(
            vars.iter().collect::<Vec<_>>(),
            vec![("A", "3"), ("B", "2")]
        );
    }

    #[test]
    fn test_yaml_order_preserved() {
        let yaml = "ZED: z\nALPHA: a\nMID: m\n";
        let vars: OrderedVars = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(vars.keys().collect::<Vec<_>>(), vec!["ZED", "ALPHA", "MID"]);

        let out = serde_yaml::to_string(&vars).unwrap();
        assert_eq!(out, yaml);
    }

    #[test]
    fn test_null_deserializes_empty() {
        let vars: Option<OrderedVars> = serde_yaml::from_str("~").unwrap();
        assert!(vars.is_none());

        let json_vars: OrderedVars = serde_json::from_str("{}").unwrap();
        assert!(json_vars.is_empty());
    }
}
