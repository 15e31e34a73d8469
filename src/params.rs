//! Stage construction parameters.
//!
//! Parameters are JSON values keyed by name, so list-valued parameters can be
//! given directly as arrays. Older configurations spell lists as flattened
//! keys (`bands.0`, `bands.1`, ...); [`Parameters::expand_list_keys`] folds
//! those back into one array per base name.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ParamError;

/// Named parameters for one stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(Map<String, Value>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a parameter, returning `self` for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deserialize a required parameter into `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, ParamError> {
        let value = self
            .0
            .get(name)
            .ok_or_else(|| ParamError::new(name, "is not set"))?;
        serde_json::from_value(value.clone()).map_err(|e| ParamError::new(name, e.to_string()))
    }

    /// Borrow a string parameter.
    pub fn get_str(&self, name: &str) -> Result<&str, ParamError> {
        match self.0.get(name) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(ParamError::new(
                name,
                format!("must be a string, got {other}"),
            )),
            None => Err(ParamError::new(name, "is not set")),
        }
    }

    /// Fold flattened list keys (`base.index`) into one array per base.
    ///
    /// Each value lands at its declared index whatever order the keys come
    /// in. Indices must cover `0..n` exactly once, and a base may not also be
    /// given as a plain key. On error the parameters are left untouched.
    pub fn expand_list_keys(&mut self) -> Result<(), ParamError> {
        let mut groups: BTreeMap<String, BTreeMap<usize, String>> = BTreeMap::new();

        for key in self.0.keys() {
            let Some((base, index)) = split_list_key(key) else {
                continue;
            };
            let index: usize = index
                .parse()
                .map_err(|_| ParamError::new(base, format!("index {index} is out of range")))?;
            let slots = groups.entry(base.to_string()).or_default();
            if let Some(previous) = slots.insert(index, key.clone()) {
                return Err(ParamError::new(
                    base,
                    format!("has index {index} more than once ('{previous}' and '{key}')"),
                ));
            }
        }

        for (base, slots) in &groups {
            if self.0.contains_key(base) {
                return Err(ParamError::new(
                    base.as_str(),
                    "is given both as a plain value and as indexed entries",
                ));
            }
            if let Some(gap) = slots.keys().enumerate().find(|(i, index)| i != *index) {
                return Err(ParamError::new(
                    base.as_str(),
                    format!("is missing index {}", gap.0),
                ));
            }
        }

        for (base, slots) in groups {
            let items = slots
                .into_values()
                .filter_map(|key| self.0.remove(&key))
                .collect();
            self.0.insert(base, Value::Array(items));
        }

        Ok(())
    }
}

/// Split `base.index` into its parts when `index` is all ASCII digits.
fn split_list_key(key: &str) -> Option<(&str, &str)> {
    let (base, index) = key.rsplit_once('.')?;
    if base.is_empty() || index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((base, index))
}

impl From<Map<String, Value>> for Parameters {
    fn from(map: Map<String, Value>) -> Self {
        Parameters(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Parameters(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expand_out_of_order_keys() {
        let mut params: Parameters = [("items.1", "y"), ("items.0", "x")].into_iter().collect();
        params.expand_list_keys().unwrap();
        assert_eq!(params.value("items"), Some(&json!(["x", "y"])));
        assert!(!params.contains("items.0"));
        assert!(!params.contains("items.1"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_expand_sorts_numerically() {
        let mut params = Parameters::new();
        for i in (0..12).rev() {
            params.insert(format!("bands.{i}"), i);
        }
        params.expand_list_keys().unwrap();
        let bands: Vec<u32> = params.get("bands").unwrap();
        assert_eq!(bands, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_expand_multiple_groups_and_plain_keys() {
        let mut params = Parameters::new()
            .with("a.0", 1)
            .with("b.0", "p")
            .with("a.1", 2)
            .with("b.1", "q")
            .with("scale", 0.5);
        params.expand_list_keys().unwrap();
        assert_eq!(params.value("a"), Some(&json!([1, 2])));
        assert_eq!(params.value("b"), Some(&json!(["p", "q"])));
        assert_eq!(params.value("scale"), Some(&json!(0.5)));
    }

    #[test]
    fn test_expand_ignores_non_list_keys() {
        let mut params = Parameters::new()
            .with("version.v1", 1)
            .with(".0", 2)
            .with("trailing.", 3)
            .with("plain", 4);
        let before = params.clone();
        params.expand_list_keys().unwrap();
        assert_eq!(params, before);
    }

    #[test]
    fn test_expand_dotted_base_uses_last_segment() {
        let mut params = Parameters::new().with("var.names.0", "u").with("var.names.1", "v");
        params.expand_list_keys().unwrap();
        assert_eq!(params.value("var.names"), Some(&json!(["u", "v"])));
    }

    #[test]
    fn test_expand_rejects_gap() {
        let mut params = Parameters::new().with("items.0", "x").with("items.2", "z");
        let err = params.expand_list_keys().unwrap_err();
        assert_eq!(err.parameter, "items");
        assert_eq!(err.reason, "is missing index 1");
        assert!(params.contains("items.0"));
    }

    #[test]
    fn test_expand_rejects_missing_zero() {
        let mut params = Parameters::new().with("items.1", "y");
        let err = params.expand_list_keys().unwrap_err();
        assert_eq!(err.reason, "is missing index 0");
    }

    #[test]
    fn test_expand_rejects_duplicate_index() {
        let mut params = Parameters::new().with("items.1", "a").with("items.01", "b").with("items.0", "c");
        let err = params.expand_list_keys().unwrap_err();
        assert_eq!(err.parameter, "items");
        assert!(err.reason.contains("index 1 more than once"));
    }

    #[test]
    fn test_expand_rejects_plain_and_indexed() {
        let mut params = Parameters::new().with("items", json!(["w"])).with("items.0", "x");
        let err = params.expand_list_keys().unwrap_err();
        assert_eq!(err.parameter, "items");
    }

    #[test]
    fn test_expand_rejects_huge_index() {
        let mut params = Parameters::new().with("items.99999999999999999999999", "x");
        let err = params.expand_list_keys().unwrap_err();
        assert!(err.reason.contains("out of range"));
    }

    #[test]
    fn test_native_list_untouched() {
        let mut params = Parameters::new().with("items", json!(["x", "y"]));
        params.expand_list_keys().unwrap();
        let items: Vec<String> = params.get("items").unwrap();
        assert_eq!(items, vec!["x", "y"]);
    }

    #[test]
    fn test_get_typed_and_errors() {
        let params = Parameters::new().with("n", 3).with("name", "u");
        assert_eq!(params.get::<u32>("n").unwrap(), 3);
        assert_eq!(params.get_str("name").unwrap(), "u");
        assert_eq!(params.get::<u32>("missing").unwrap_err().reason, "is not set");
        assert!(params.get::<u32>("name").is_err());
        assert!(params.get_str("n").unwrap_err().reason.contains("must be a string"));
    }

    #[test]
    fn test_deserialize_transparent() {
        let params: Parameters = serde_json::from_value(json!({"u_or_v": "u"})).unwrap();
        assert_eq!(params.get_str("u_or_v").unwrap(), "u");
    }
}
