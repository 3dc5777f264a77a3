//! Declarative resource documents
//!
//! Files and API bodies arrive as YAML or JSON. They are parsed at the file
//! boundary ([`format`]), folded into one canonical string-keyed value
//! ([`normalize`]), and read as `{kind, metadata, spec}` envelopes
//! ([`envelope`]).

mod envelope;
mod format;
mod kind;
mod normalize;

pub use envelope::{Metadata, ManifestEnvelope, clone_marker, lifecycle_policy_body};
pub use format::{DocumentFormat, RawDocument, parse_for_path, read_document};
pub use kind::ResourceKind;
pub use normalize::{Normalized, Normalizer, normalize, normalize_tracked};

use thiserror::Error;

/// Validation and parse failures for resource documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document is not a mapping")]
    NotAMapping,

    #[error("document has no kind")]
    MissingKind,

    #[error("unknown kind: {0}")]
    UnknownKind(String),

    #[error("{0} requires metadata.name")]
    MissingName(ResourceKind),

    #[error("{0} spec must be a mapping")]
    SpecNotMapping(ResourceKind),

    #[error("non-string keys dropped: {}", .0.join(", "))]
    DroppedKeys(Vec<String>),
}
