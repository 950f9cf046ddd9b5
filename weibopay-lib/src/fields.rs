//! Scalar field maps used for outbound payloads and inbound notifications.
//!
//! Keys are unique and iterate in byte-lexicographic order, which is also
//! the order the canonical signing string needs. A value that is the empty
//! string or [`FieldValue::Null`] is treated as "not present" when signing.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use url::form_urlencoded;

use crate::{Result, WeiboPayError};

/// A scalar value in a [`FieldMap`].
///
/// Deserialization goes through [`TryFrom<Value>`], so a serde-loaded map and
/// [`FieldMap::from_json_object`] accept the same inputs.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Explicitly absent value.
    Null,
    /// Text value.
    Text(String),
    /// Numeric value, rendered with its JSON representation.
    Number(Number),
}

impl FieldValue {
    /// Returns false for `Null` and for the empty string.
    pub fn is_present(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Text(s) => !s.is_empty(),
            Self::Number(_) => true,
        }
    }

    /// Borrow the value when it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write_number(f, n),
        }
    }
}

/// Integral floats render without a fractional part (`1.0` signs as `1`).
fn write_number(f: &mut fmt::Formatter<'_>, n: &Number) -> fmt::Result {
    if n.is_f64() {
        if let Some(x) = n.as_f64() {
            if x.fract() == 0.0 && x.abs() < 1e15 {
                return write!(f, "{}", x as i64);
            }
        }
    }
    write!(f, "{}", n)
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl TryFrom<f64> for FieldValue {
    type Error = WeiboPayError;

    /// Rejects NaN and infinities, which have no wire form.
    fn try_from(n: f64) -> Result<Self> {
        Number::from_f64(n)
            .map(Self::Number)
            .ok_or_else(|| WeiboPayError::invalid_data("field", format!("{} is not a finite number", n)))
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Value> for FieldValue {
    type Error = WeiboPayError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::String(s) => Ok(Self::Text(s)),
            Value::Number(n) => Ok(Self::Number(n)),
            Value::Bool(true) => Ok(Self::Text("1".to_string())),
            Value::Bool(false) => Ok(Self::Text(String::new())),
            Value::Array(_) | Value::Object(_) => Err(WeiboPayError::invalid_data(
                "field",
                "nested arrays and objects are not scalar fields",
            )),
        }
    }
}

/// Mapping from string keys to scalar values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, FieldValue>);

impl FieldMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a field value.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// Get a present field rendered as text.
    ///
    /// Returns `None` for missing, `Null` and empty-string values.
    pub fn get_text(&self, key: &str) -> Option<String> {
        self.0
            .get(key)
            .filter(|v| v.is_present())
            .map(|v| v.to_string())
    }

    /// Remove a field.
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.0.remove(key)
    }

    /// Check whether a key exists (present or not).
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
        self.0.iter()
    }

    /// Overlay `other` on top of this map; values from `other` win.
    pub fn merge(&mut self, other: FieldMap) {
        self.0.extend(other.0);
    }

    /// Drop every field whose value is empty or `Null`.
    pub fn filtered(mut self) -> Self {
        self.0.retain(|_, v| v.is_present());
        self
    }

    /// Parse `application/x-www-form-urlencoded` text (a POST body or a query string).
    ///
    /// A leading `?` is ignored. Repeated keys keep the last value.
    pub fn from_form(input: &str) -> Self {
        let input = input.strip_prefix('?').unwrap_or(input);
        form_urlencoded::parse(input.as_bytes())
            .map(|(k, v)| (k.into_owned(), FieldValue::Text(v.into_owned())))
            .collect()
    }

    /// Render as `application/x-www-form-urlencoded` text in key order.
    ///
    /// `Null` values are skipped; empty strings are kept as `key=`.
    pub fn to_form(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.0 {
            if matches!(value, FieldValue::Null) {
                continue;
            }
            serializer.append_pair(key, &value.to_string());
        }
        serializer.finish()
    }

    /// Build a map from a JSON object with scalar values.
    pub fn from_json_object(object: Map<String, Value>) -> Result<Self> {
        let mut map = Self::new();
        for (key, value) in object {
            let value = FieldValue::try_from(value).map_err(|_| {
                WeiboPayError::invalid_data(key.clone(), "expected a string or number")
            })?;
            map.0.insert(key, value);
        }
        Ok(map)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<FieldValue>, const N: usize> From<[(K, V); N]> for FieldMap {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> Extend<(K, V)> for FieldMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, FieldValue);
    type IntoIter = btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldMap {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl TryFrom<Value> for FieldMap {
    type Error = WeiboPayError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(object) => Self::from_json_object(object),
            _ => Err(WeiboPayError::invalid_data("fields", "expected a JSON object")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_rules() {
        assert!(!FieldValue::Null.is_present());
        assert!(!FieldValue::from("").is_present());
        assert!(FieldValue::from("0").is_present());
        assert!(FieldValue::from(0i64).is_present());
    }

    #[test]
    fn test_merge_overrides_defaults() {
        let mut base = FieldMap::from([("sign_type", "rsa"), ("notify_url", "")]);
        base.merge(FieldMap::from([("notify_url", "https://shop.example/notify")]));
        assert_eq!(
            base.get_text("notify_url").as_deref(),
            Some("https://shop.example/notify")
        );
        assert_eq!(base.get_text("sign_type").as_deref(), Some("rsa"));
    }

    #[test]
    fn test_filtered_drops_empty_and_null() {
        let mut map = FieldMap::from([("a", "1"), ("b", "")]);
        map.insert("c", FieldValue::Null);
        map.insert("d", 0i64);

        let filtered = map.filtered();
        let keys: Vec<_> = filtered.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "d"]);
    }

    #[test]
    fn test_form_round_trip_keeps_special_characters() {
        let map = FieldMap::from([("body", "a b&c"), ("sign", "ab+/=")]);
        let form = map.to_form();
        assert_eq!(form, "body=a+b%26c&sign=ab%2B%2F%3D");
        assert_eq!(FieldMap::from_form(&form), map);
    }

    #[test]
    fn test_from_form_strips_question_mark() {
        let map = FieldMap::from_form("?foo=bar&empty=");
        assert_eq!(map.get_text("foo").as_deref(), Some("bar"));
        assert!(map.contains_key("empty"));
        assert_eq!(map.get_text("empty"), None);
    }

    #[test]
    fn test_from_json_object() {
        let value = serde_json::json!({"total_fee": 100, "body": "test", "memo": null});
        let map = FieldMap::try_from(value).unwrap();
        assert_eq!(map.get_text("total_fee").as_deref(), Some("100"));
        assert_eq!(map.get("memo"), Some(&FieldValue::Null));

        let nested = serde_json::json!({"detail": {"a": 1}});
        assert!(FieldMap::try_from(nested).is_err());
    }

    #[test]
    fn test_integral_float_renders_as_integer() {
        let map = FieldMap::new()
            .with("total_fee", FieldValue::try_from(1.0f64).unwrap())
            .with("rate", FieldValue::try_from(0.25f64).unwrap());
        assert_eq!(map.get_text("total_fee").as_deref(), Some("1"));
        assert_eq!(map.get_text("rate").as_deref(), Some("0.25"));
        assert_eq!(
            crate::signing::canonical_string(&map),
            "rate=0.25&total_fee=1"
        );

        let parsed = FieldMap::try_from(serde_json::json!({"total_fee": 100.0})).unwrap();
        assert_eq!(parsed.get_text("total_fee").as_deref(), Some("100"));
    }

    #[test]
    fn test_non_finite_float_rejected() {
        assert!(matches!(
            FieldValue::try_from(f64::NAN),
            Err(WeiboPayError::InvalidData { .. })
        ));
        assert!(FieldValue::try_from(f64::INFINITY).is_err());
    }

    #[test]
    fn test_serde_and_json_object_agree_on_booleans() {
        let json = r#"{"agree": true, "refuse": false, "n": 3}"#;
        let via_serde: FieldMap = serde_json::from_str(json).unwrap();
        let via_object = FieldMap::try_from(serde_json::from_str::<Value>(json).unwrap()).unwrap();
        assert_eq!(via_serde, via_object);
        assert_eq!(via_serde.get_text("agree").as_deref(), Some("1"));
        assert_eq!(via_serde.get_text("refuse"), None);

        assert!(serde_json::from_str::<FieldMap>(r#"{"detail": [1, 2]}"#).is_err());
    }

    #[test]
    fn test_to_form_skips_null() {
        let mut map = FieldMap::from([("a", "1")]);
        map.insert("b", FieldValue::Null);
        map.insert("c", "");
        assert_eq!(map.to_form(), "a=1&c=");
    }
}
