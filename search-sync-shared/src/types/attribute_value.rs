//! Tagged attribute values as they appear in change-stream records.
//!
//! Every value in a stream image is wrapped in a single-key object naming its
//! storage type (`{"S": "text"}`, `{"N": "42"}`, `{"M": {...}}`, ...). This
//! module models those values and converts them into plain JSON for indexing.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::document::DocumentFields;

/// An attribute name to tagged value mapping.
///
/// Insertion order is preserved: the order of key attributes determines the
/// object identity derived from them.
pub type AttributeMap = IndexMap<String, AttributeValue>;

/// A value annotated with its storage-type tag.
///
/// Serialized with serde's externally tagged representation, which is exactly
/// the stream wire format. An unknown tag, or an object carrying more than one
/// tag, fails to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// String.
    #[serde(rename = "S")]
    S(String),
    /// Number, kept as its decimal text.
    #[serde(rename = "N")]
    N(String),
    /// Binary, kept as its base64 text.
    #[serde(rename = "B")]
    B(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    /// Ordered list of nested values.
    #[serde(rename = "L")]
    L(Vec<AttributeValue>),
    /// Map of nested values.
    #[serde(rename = "M")]
    M(AttributeMap),
    /// String set.
    #[serde(rename = "SS")]
    Ss(Vec<String>),
    /// Number set.
    #[serde(rename = "NS")]
    Ns(Vec<String>),
    /// Binary set.
    #[serde(rename = "BS")]
    Bs(Vec<String>),
}

impl AttributeValue {
    /// Convert into a plain JSON value, dropping the type tags.
    ///
    /// Numbers are not parsed: they become JSON strings holding the original
    /// decimal text, so large integers and high-precision decimals survive
    /// unchanged. Binary values stay base64 text. Sets become arrays and are
    /// not checked for uniqueness.
    pub fn into_plain(self) -> Value {
        match self {
            Self::S(text) | Self::N(text) | Self::B(text) => Value::String(text),
            Self::Bool(flag) => Value::Bool(flag),
            Self::Null(_) => Value::Null,
            Self::L(items) => Value::Array(items.into_iter().map(Self::into_plain).collect()),
            Self::M(map) => Value::Object(deserialize_image(map)),
            Self::Ss(items) | Self::Ns(items) | Self::Bs(items) => {
                Value::Array(items.into_iter().map(Value::String).collect())
            }
        }
    }
}

/// Convert a whole attribute image into plain document fields.
pub fn deserialize_image(image: AttributeMap) -> DocumentFields {
    image
        .into_iter()
        .map(|(name, value)| (name, value.into_plain()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_scalar_tags() {
        let image: AttributeMap = serde_json::from_value(json!({
            "title": {"S": "Hello"},
            "views": {"N": "12345678901234567890.000001"},
            "blob": {"B": "aGVsbG8="},
            "published": {"BOOL": true},
            "deleted_at": {"NULL": true}
        }))
        .unwrap();

        let fields = deserialize_image(image);

        assert_eq!(fields["title"], json!("Hello"));
        assert_eq!(fields["views"], json!("12345678901234567890.000001"));
        assert_eq!(fields["blob"], json!("aGVsbG8="));
        assert_eq!(fields["published"], json!(true));
        assert_eq!(fields["deleted_at"], Value::Null);
    }

    #[test]
    fn test_nested_tags() {
        let image: AttributeMap = serde_json::from_value(json!({
            "author": {"M": {
                "name": {"S": "Ada"},
                "tags": {"SS": ["math", "engines"]},
                "history": {"L": [{"N": "1"}, {"M": {"deep": {"NS": ["2", "3"]}}}]}
            }},
            "chunks": {"BS": ["AAE=", "AgM="]}
        }))
        .unwrap();

        let fields = deserialize_image(image);

        assert_eq!(
            Value::Object(fields),
            json!({
                "author": {
                    "name": "Ada",
                    "tags": ["math", "engines"],
                    "history": ["1", {"deep": ["2", "3"]}]
                },
                "chunks": ["AAE=", "AgM="]
            })
        );
    }

    #[test]
    fn test_map_preserves_key_order() {
        let image: AttributeMap = serde_json::from_value(json!({
            "zeta": {"S": "z"},
            "alpha": {"S": "a"},
            "mid": {"S": "m"}
        }))
        .unwrap();

        let names: Vec<_> = deserialize_image(image).keys().cloned().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let result: Result<AttributeMap, _> =
            serde_json::from_value(json!({"title": {"X": "nope"}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_multiple_tags_are_rejected() {
        let result: Result<AttributeMap, _> =
            serde_json::from_value(json!({"title": {"S": "a", "N": "1"}}));
        assert!(result.is_err());
    }

    fn arb_attribute_value() -> impl Strategy<Value = AttributeValue> {
        let leaf = prop_oneof![
            "[a-zA-Z0-9 ]{0,8}".prop_map(AttributeValue::S),
            "-?[0-9]{1,24}(\\.[0-9]{1,8})?".prop_map(AttributeValue::N),
            "[A-Za-z0-9+/]{0,12}".prop_map(AttributeValue::B),
            any::<bool>().prop_map(AttributeValue::Bool),
            Just(AttributeValue::Null(true)),
            prop::collection::vec("[a-z]{1,4}", 0..4).prop_map(AttributeValue::Ss),
            prop::collection::vec("[0-9]{1,4}", 0..4).prop_map(AttributeValue::Ns),
            prop::collection::vec("[A-Za-z0-9+/]{0,8}", 0..4).prop_map(AttributeValue::Bs),
        ];
        leaf.prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(AttributeValue::L),
                prop::collection::vec(("[a-z]{1,6}", inner), 0..4)
                    .prop_map(|entries| AttributeValue::M(entries.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn test_tagged_round_trip(value in arb_attribute_value()) {
            let tagged = serde_json::to_value(&value).unwrap();
            let parsed: AttributeValue = serde_json::from_value(tagged.clone()).unwrap();
            prop_assert_eq!(&parsed, &value);
            prop_assert_eq!(serde_json::to_value(&parsed).unwrap(), tagged);
        }
    }
}
