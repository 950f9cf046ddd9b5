//! Canonical string construction.
//!
//! The canonical string is the exact byte input to RSA signing on both
//! sides of the wire, so it must match the provider's own signer:
//! keys in ascending byte order, `sign`, `sign_type` and `endpoint` left
//! out, empty and absent values left out, `key=value` pairs joined by `&`.

use crate::FieldMap;

/// Keys that never take part in the canonical string.
pub const EXCLUDED_KEYS: [&str; 3] = ["sign", "sign_type", "endpoint"];

/// Build the canonical string for `fields`.
///
/// # Example
///
/// ```
/// use weibopay_lib::{signing::canonical_string, FieldMap};
///
/// let fields = FieldMap::from([("b", "2"), ("a", "1"), ("sign", "x")]);
/// assert_eq!(canonical_string(&fields), "a=1&b=2");
/// ```
pub fn canonical_string(fields: &FieldMap) -> String {
    let mut content = String::new();
    for (key, value) in fields {
        if EXCLUDED_KEYS.contains(&key.as_str()) || !value.is_present() {
            continue;
        }
        if !content.is_empty() {
            content.push('&');
        }
        content.push_str(key);
        content.push('=');
        content.push_str(&value.to_string());
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldValue;
    use proptest::prelude::*;

    #[test]
    fn test_sorted_and_filtered() {
        let fields = FieldMap::from([("b", "2"), ("a", "1"), ("sign", "x")]);
        assert_eq!(canonical_string(&fields), "a=1&b=2");
    }

    #[test]
    fn test_excluded_keys_and_empty_values() {
        let mut fields = FieldMap::from([
            ("seller_id", "seller_id"),
            ("sign_type", "rsa"),
            ("endpoint", "query"),
            ("notify_url", ""),
            ("appkey", "appkey"),
        ]);
        fields.insert("body", FieldValue::Null);
        fields.insert("total_fee", 1i64);

        assert_eq!(
            canonical_string(&fields),
            "appkey=appkey&seller_id=seller_id&total_fee=1"
        );
    }

    #[test]
    fn test_values_are_not_escaped() {
        let fields = FieldMap::from([("return_url", "https://shop.example/done?a=1&b=2")]);
        assert_eq!(
            canonical_string(&fields),
            "return_url=https://shop.example/done?a=1&b=2"
        );
    }

    #[test]
    fn test_empty_map() {
        assert_eq!(canonical_string(&FieldMap::new()), "");
        assert_eq!(canonical_string(&FieldMap::from([("sign", "abc")])), "");
    }

    #[test]
    fn test_byte_order_puts_uppercase_first() {
        let fields = FieldMap::from([("a", "1"), ("B", "2"), ("_x", "3")]);
        assert_eq!(canonical_string(&fields), "B=2&_x=3&a=1");
    }

    proptest! {
        #[test]
        fn prop_insertion_order_does_not_matter(
            entries in proptest::collection::btree_map("[a-z_]{1,8}", "[a-zA-Z0-9]{0,6}", 0..12)
        ) {
            let forward: FieldMap = entries.clone().into_iter().collect();
            let reversed: FieldMap = entries.into_iter().rev().collect();
            prop_assert_eq!(canonical_string(&forward), canonical_string(&reversed));
        }

        #[test]
        fn prop_never_contains_excluded_or_empty(
            entries in proptest::collection::vec(("[a-z_]{1,10}", "[a-z0-9]{0,4}"), 0..12)
        ) {
            let mut fields: FieldMap = entries.into_iter().collect();
            fields.insert("sign", "zzz");
            fields.insert("sign_type", "rsa");
            fields.insert("endpoint", "query");

            let content = canonical_string(&fields);
            prop_assert!(!content.starts_with('&'));
            prop_assert!(!content.ends_with('&'));
            for pair in content.split('&').filter(|p| !p.is_empty()) {
                let (key, value) = pair.split_once('=').unwrap();
                prop_assert!(!EXCLUDED_KEYS.contains(&key));
                prop_assert!(!value.is_empty());
            }
        }
    }
}
