//! Property value extraction.
//!
//! Property sources return either flat scalars (`"acme.com"`) or wrapped
//! records (`{"value": "acme.com", "source": "CRM_UI"}`). Everything past this
//! module sees plain strings.

use serde_json::Value;
use std::collections::BTreeMap;

/// Raw property values keyed by property name, as returned by a property source.
pub type PropertyValues = BTreeMap<String, Value>;

/// Flatten a raw property value into a plain string.
///
/// - `null` becomes `""`.
/// - An object with a `value` field yields that field, with `null` as `""`.
/// - Anything else is coerced to text: strings as-is, numbers and booleans
///   in their JSON spelling, arrays joined with `,`, other objects as compact JSON.
///
/// Never fails.
#[must_use]
pub fn extract_property_value(raw: &Value) -> String {
    match raw {
        Value::Object(fields) => fields.get("value").map_or_else(|| coerce(raw), coerce),
        other => coerce(other),
    }
}

/// Look up `name` in `values` and flatten it; missing properties are `""`.
#[must_use]
pub fn extract_named(values: &PropertyValues, name: &str) -> String {
    values
        .get(name)
        .map(extract_property_value)
        .unwrap_or_default()
}

fn coerce(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(items) => items.iter().map(coerce).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn flattens_scalars_and_wrappers() {
        assert_eq!(extract_property_value(&Value::Null), "");
        assert_eq!(extract_property_value(&json!("acme.com")), "acme.com");
        assert_eq!(extract_property_value(&json!(42)), "42");
        assert_eq!(extract_property_value(&json!(true)), "true");
        assert_eq!(
            extract_property_value(&json!({ "value": "acme.com", "source": "CRM_UI" })),
            "acme.com"
        );
        assert_eq!(extract_property_value(&json!({ "value": null })), "");
        assert_eq!(extract_property_value(&json!({ "value": 7.5 })), "7.5");
    }

    #[test]
    fn coerces_containers_without_value_field() {
        assert_eq!(extract_property_value(&json!(["a", 1, null])), "a,1,");
        assert_eq!(
            extract_property_value(&json!({ "label": "x" })),
            r#"{"label":"x"}"#
        );
    }

    #[test]
    fn missing_named_property_is_empty() {
        let mut values = PropertyValues::new();
        values.insert("site".to_owned(), json!({ "value": "x.io" }));
        assert_eq!(extract_named(&values, "site"), "x.io");
        assert_eq!(extract_named(&values, "other"), "");
    }

    fn raw_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            ".*".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 16, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                inner.prop_map(|value| json!({ "value": value })),
            ]
        })
    }

    proptest! {
        #[test]
        fn extraction_is_idempotent(raw in raw_value()) {
            let flat = extract_property_value(&raw);
            prop_assert_eq!(extract_property_value(&Value::String(flat.clone())), flat);
        }

        #[test]
        fn flat_strings_pass_through(text in ".*") {
            prop_assert_eq!(extract_property_value(&Value::String(text.clone())), text);
        }
    }
}
