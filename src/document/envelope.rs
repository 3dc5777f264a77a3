//! `{kind, metadata, spec}` resource envelopes

use super::{DocumentError, ResourceKind};
use serde_json::{Map, Value, json};

/// Envelope metadata. Only `name` is interpreted; other keys are carried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub name: String,
    pub extra: Map<String, Value>,
}

/// A canonical resource document.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEnvelope {
    pub kind: ResourceKind,
    pub metadata: Metadata,
    pub spec: Value,
}

/// Top-level keys that are never part of an implicit spec.
const ENVELOPE_KEYS: &[&str] = &["apiVersion", "kind", "metadata", "spec"];

impl ManifestEnvelope {
    pub fn new(kind: ResourceKind, name: impl Into<String>, spec: Value) -> Self {
        Self {
            kind,
            metadata: Metadata {
                name: name.into(),
                extra: Map::new(),
            },
            spec,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Read an envelope from a canonical document.
    ///
    /// A missing `kind` falls back to `fallback_kind` (the kind implied by
    /// the directory a file was found in). When `spec` is absent the rest of
    /// the document is the spec.
    pub fn from_document(
        document: Value,
        fallback_kind: Option<ResourceKind>,
    ) -> Result<Self, DocumentError> {
        let Value::Object(mut map) = document else {
            return Err(DocumentError::NotAMapping);
        };

        let kind = match map.get("kind") {
            Some(Value::String(kind)) if !kind.trim().is_empty() => kind.parse()?,
            Some(Value::String(_)) | Some(Value::Null) | None => {
                fallback_kind.ok_or(DocumentError::MissingKind)?
            }
            Some(other) => return Err(DocumentError::UnknownKind(other.to_string())),
        };

        let mut metadata = match map.remove("metadata") {
            Some(Value::Object(meta)) => meta,
            _ => Map::new(),
        };
        let name = match metadata.remove("name") {
            Some(Value::String(name)) => name.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        if name.is_empty() && kind.requires_name() {
            return Err(DocumentError::MissingName(kind));
        }

        let spec = match map.remove("spec") {
            Some(spec @ Value::Object(_)) => spec,
            Some(_) => return Err(DocumentError::SpecNotMapping(kind)),
            None => {
                map.retain(|key, _| !ENVELOPE_KEYS.contains(&key.as_str()));
                Value::Object(map)
            }
        };

        Ok(Self {
            kind,
            metadata: Metadata {
                name,
                extra: metadata,
            },
            spec,
        })
    }

    /// Render back to a document. Nameless kinds get empty metadata.
    pub fn to_value(&self) -> Value {
        let mut metadata = self.metadata.extra.clone();
        if !self.metadata.name.is_empty() {
            metadata.insert("name".to_string(), Value::String(self.metadata.name.clone()));
        }
        json!({
            "kind": self.kind.as_str(),
            "metadata": metadata,
            "spec": self.spec,
        })
    }

    /// The body sent to the cluster when this resource is created.
    pub fn create_body(&self) -> Value {
        match self.kind {
            ResourceKind::LifecyclePolicy => lifecycle_policy_body(&self.spec),
            _ => self.spec.clone(),
        }
    }
}

/// Lifecycle policy APIs take `{"policy": {...}}`. Specs that already carry
/// the wrapper are sent as-is.
pub fn lifecycle_policy_body(spec: &Value) -> Value {
    match spec {
        Value::Object(map) if map.contains_key("policy") => spec.clone(),
        _ => json!({ "policy": spec }),
    }
}

/// Marker document written at the root of every export.
pub fn clone_marker() -> Value {
    json!({ "kind": "CloneManifest", "metadata": {}, "spec": {} })
}
