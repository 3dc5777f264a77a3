//! Canonicalization of parsed documents
//!
//! Every document is folded into a [`serde_json::Value`]: string keys at
//! every level, sequences in order, scalars unchanged. Mapping entries whose
//! key is not a string are dropped, and their paths are reported so callers
//! can warn or reject.

use super::{DocumentError, RawDocument};
use crate::etl::Transformer;
use owo_colors::OwoColorize;
use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

/// A canonical document plus the paths of any entries that were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub value: Value,
    pub dropped: Vec<String>,
}

/// Fold a parsed document into its canonical form. Never fails.
pub fn normalize(document: RawDocument) -> Value {
    normalize_tracked(document).value
}

/// Like [`normalize`], also reporting dropped key paths.
pub fn normalize_tracked(document: RawDocument) -> Normalized {
    let mut dropped = Vec::new();
    let value = match document {
        RawDocument::Json(value) => value,
        RawDocument::Yaml(value) => fold_yaml(value, "", &mut dropped),
    };
    Normalized { value, dropped }
}

fn fold_yaml(value: YamlValue, path: &str, dropped: &mut Vec<String>) -> Value {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => fold_number(&n),
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| fold_yaml(item, &format!("{}[{}]", path, i), dropped))
                .collect(),
        ),
        YamlValue::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                match key {
                    YamlValue::String(key) => {
                        let child = child_path(path, &key);
                        let value = fold_yaml(value, &child, dropped);
                        map.insert(key, value);
                    }
                    other => dropped.push(child_path(path, &describe_key(&other))),
                }
            }
            Value::Object(map)
        }
        YamlValue::Tagged(tagged) => fold_yaml(tagged.value, path, dropped),
    }
}

/// Non-finite floats have no JSON representation and become null.
fn fold_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn describe_key(key: &YamlValue) -> String {
    match key {
        YamlValue::Null => "~".to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Sequence(_) => "<sequence>".to_string(),
        YamlValue::Mapping(_) => "<mapping>".to_string(),
        YamlValue::Tagged(t) => format!("!{}", t.tag),
        YamlValue::String(s) => s.clone(),
    }
}

/// Normalization as a pipeline stage.
///
/// Lenient mode drops non-string keys with a warning; strict mode rejects
/// the document instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    strict: bool,
}

impl Normalizer {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }
}

impl Transformer for Normalizer {
    type Input = RawDocument;
    type Output = Value;

    fn transform(&self, input: Self::Input) -> eyre::Result<Self::Output> {
        let Normalized { value, dropped } = normalize_tracked(input);
        if dropped.is_empty() {
            return Ok(value);
        }
        if self.strict {
            return Err(DocumentError::DroppedKeys(dropped).into());
        }
        for path in &dropped {
            log::warn!("Dropped non-string key at {}", path.yellow());
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn yaml(text: &str) -> RawDocument {
        RawDocument::Yaml(serde_yaml::from_str(text).unwrap())
    }

    #[test]
    fn test_string_keys_survive() {
        let value = normalize(yaml(
            "kind: IndexTemplate\nmetadata:\n  name: logs\nspec:\n  index_patterns: [\"logs-*\"]\n  priority: 100\n",
        ));
        assert_eq!(
            value,
            json!({
                "kind": "IndexTemplate",
                "metadata": {"name": "logs"},
                "spec": {"index_patterns": ["logs-*"], "priority": 100}
            })
        );
    }

    #[test]
    fn test_non_string_keys_are_dropped_and_reported() {
        let result = normalize_tracked(yaml(
            "spec:\n  1: one\n  true: yes\n  keep: kept\n  nested:\n    - {2: two, name: x}\n",
        ));
        assert_eq!(
            result.value,
            json!({"spec": {"keep": "kept", "nested": [{"name": "x"}]}})
        );
        assert_eq!(result.dropped, vec!["spec.1", "spec.true", "spec.nested[0].2"]);
    }

    #[test]
    fn test_tagged_values_are_unwrapped() {
        let value = normalize(yaml("a: !custom 5\n"));
        assert_eq!(value, json!({"a": 5}));
    }

    #[test]
    fn test_non_finite_float_becomes_null() {
        let value = normalize(yaml("a: .nan\nb: 1.5\n"));
        assert_eq!(value, json!({"a": null, "b": 1.5}));
    }

    #[test]
    fn test_strict_normalizer_rejects_dropped_keys() {
        let err = Normalizer::new(true)
            .transform(yaml("1: one\n"))
            .unwrap_err();
        let doc_err = err.downcast_ref::<DocumentError>().unwrap();
        assert!(matches!(doc_err, DocumentError::DroppedKeys(keys) if keys == &vec!["1".to_string()]));

        let value = Normalizer::new(false).transform(yaml("1: one\nb: 2\n")).unwrap();
        assert_eq!(value, json!({"b": 2}));
    }

    fn json_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|i| json!(i)),
            "[a-z]{0,8}".prop_map(Value::String),
        ]
    }

    fn json_tree() -> impl Strategy<Value = Value> {
        json_leaf().prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z_]{1,6}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn yaml_key() -> impl Strategy<Value = YamlValue> {
        prop_oneof![
            "[a-z]{1,6}".prop_map(YamlValue::String),
            any::<i32>().prop_map(|i| YamlValue::Number(i.into())),
            any::<bool>().prop_map(YamlValue::Bool),
        ]
    }

    fn yaml_tree() -> impl Strategy<Value = YamlValue> {
        let leaf = prop_oneof![
            Just(YamlValue::Null),
            any::<bool>().prop_map(YamlValue::Bool),
            any::<i64>().prop_map(|i| YamlValue::Number(i.into())),
            "[a-z]{0,8}".prop_map(YamlValue::String),
        ];
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(YamlValue::Sequence),
                prop::collection::vec((yaml_key(), inner), 0..4)
                    .prop_map(|entries| YamlValue::Mapping(entries.into_iter().collect())),
            ]
        })
    }

    fn has_non_string_key(original: &YamlValue) -> bool {
        match original {
            YamlValue::Mapping(m) => m.iter().any(|(k, v)| !k.is_string() || has_non_string_key(v)),
            YamlValue::Sequence(items) => items.iter().any(has_non_string_key),
            _ => false,
        }
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(tree in yaml_tree()) {
            let once = normalize(RawDocument::Yaml(tree));
            let twice = normalize(RawDocument::Json(once.clone()));
            prop_assert_eq!(&once, &twice);

            let yaml_again = serde_yaml::to_value(&once).unwrap();
            prop_assert_eq!(normalize(RawDocument::Yaml(yaml_again)), once);
        }

        #[test]
        fn prop_string_keyed_documents_lose_nothing(tree in json_tree()) {
            let as_yaml = serde_yaml::to_value(&tree).unwrap();
            let result = normalize_tracked(RawDocument::Yaml(as_yaml));
            prop_assert!(result.dropped.is_empty());
            prop_assert_eq!(result.value, tree);
        }

        #[test]
        fn prop_only_non_string_keys_are_dropped(tree in yaml_tree()) {
            let result = normalize_tracked(RawDocument::Yaml(tree.clone()));
            prop_assert_eq!(!result.dropped.is_empty(), has_non_string_key(&tree));
        }

        #[test]
        fn prop_inserted_non_string_key_is_absent(tree in json_tree(), key in any::<i32>()) {
            let mut mapping = serde_yaml::Mapping::new();
            mapping.insert(YamlValue::String("kept".to_string()), serde_yaml::to_value(&tree).unwrap());
            mapping.insert(YamlValue::Number(key.into()), YamlValue::String("gone".to_string()));
            let result = normalize_tracked(RawDocument::Yaml(YamlValue::Mapping(mapping)));
            prop_assert_eq!(result.value, json!({"kept": tree}));
            prop_assert_eq!(result.dropped, vec![key.to_string()]);
        }
    }
}
