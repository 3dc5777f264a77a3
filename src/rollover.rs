//! Rollover conditions from flags and files

use crate::document::{DocumentError, parse_for_path, normalize};
use serde_json::{Map, Value};
use std::path::Path;

/// Conditions given on the command line. Unset values are left out of the
/// request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RolloverConditions {
    pub max_age: Option<String>,
    pub max_docs: Option<u64>,
    pub max_size: Option<String>,
    pub max_primary_shard_size: Option<String>,
    pub max_primary_shard_docs: Option<u64>,
}

impl RolloverConditions {
    /// Flag conditions as a JSON map. Counts stay numbers, sizes and ages
    /// stay strings.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        let strings = [
            ("max_age", &self.max_age),
            ("max_size", &self.max_size),
            ("max_primary_shard_size", &self.max_primary_shard_size),
        ];
        for (key, value) in strings {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                map.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
        let counts = [
            ("max_docs", self.max_docs),
            ("max_primary_shard_docs", self.max_primary_shard_docs),
        ];
        for (key, value) in counts {
            if let Some(value) = value.filter(|v| *v > 0) {
                map.insert(key.to_string(), Value::from(value));
            }
        }
        map
    }

    /// Flag conditions overlaid with the file's. The file wins on conflicts
    /// and may carry keys no flag covers.
    pub fn merged_with_file(&self, path: Option<&Path>) -> Result<Map<String, Value>, DocumentError> {
        let mut conditions = self.to_map();
        if let Some(path) = path {
            conditions.extend(read_conditions(path)?);
        }
        Ok(conditions)
    }
}

/// Read a conditions file. Its top level must be a mapping.
pub fn read_conditions(path: &Path) -> Result<Map<String, Value>, DocumentError> {
    let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.display().to_string(),
        source,
    })?;
    match normalize(parse_for_path(path, &text)?) {
        Value::Object(map) => Ok(map),
        _ => Err(DocumentError::NotAMapping),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_flags_to_map() {
        let conditions = RolloverConditions {
            max_age: Some("30d".to_string()),
            max_docs: Some(0),
            max_primary_shard_docs: Some(500),
            ..Default::default()
        };
        assert_eq!(
            Value::Object(conditions.to_map()),
            json!({"max_age": "30d", "max_primary_shard_docs": 500})
        );
    }

    #[test]
    fn test_file_merges_over_flags_with_types_preserved() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("conditions.json");
        std::fs::write(&path, r#"{"max_age": "7d", "max_docs": 1000}"#).unwrap();

        let flags = RolloverConditions {
            max_size: Some("5gb".to_string()),
            max_age: Some("1d".to_string()),
            ..Default::default()
        };
        let merged = flags.merged_with_file(Some(&path)).unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged["max_age"], json!("7d"));
        assert_eq!(merged["max_docs"], json!(1000));
        assert!(merged["max_docs"].is_number());
        assert_eq!(merged["max_size"], json!("5gb"));
    }

    #[test]
    fn test_yaml_file_and_extra_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("conditions.yml");
        std::fs::write(&path, "max_docs: 10\nmin_docs: 1\n").unwrap();
        let merged = RolloverConditions::default()
            .merged_with_file(Some(&path))
            .unwrap();
        assert_eq!(Value::Object(merged), json!({"max_docs": 10, "min_docs": 1}));
    }

    #[test]
    fn test_non_mapping_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("conditions.yaml");
        std::fs::write(&path, "- max_docs\n").unwrap();
        assert!(matches!(read_conditions(&path), Err(DocumentError::NotAMapping)));
    }
}
