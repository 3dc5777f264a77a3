//! YAML/JSON parsing and serialization at the file boundary

use super::DocumentError;
use serde_json::Value;
use std::path::Path;

/// On-disk document format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// `.yaml`/`.yml` or `.json` (case-insensitive); anything else is `None`.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }

    pub fn parse(self, text: &str) -> Result<RawDocument, DocumentError> {
        match self {
            Self::Yaml => Ok(RawDocument::Yaml(serde_yaml::from_str(text)?)),
            Self::Json => Ok(RawDocument::Json(serde_json::from_str(text)?)),
        }
    }

    /// Render a canonical document. JSON output is pretty-printed with a
    /// trailing newline.
    pub fn render(self, value: &Value) -> Result<String, DocumentError> {
        match self {
            Self::Yaml => Ok(serde_yaml::to_string(value)?),
            Self::Json => Ok(format!("{}\n", serde_json::to_string_pretty(value)?)),
        }
    }
}

/// A parsed document before normalization.
///
/// YAML mappings may carry keys of any type; JSON objects are always
/// string-keyed.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDocument {
    Yaml(serde_yaml::Value),
    Json(Value),
}

/// Parse `text` using the format implied by `path`. Unknown extensions try
/// JSON first, then YAML.
pub fn parse_for_path(path: impl AsRef<Path>, text: &str) -> Result<RawDocument, DocumentError> {
    match DocumentFormat::from_path(&path) {
        Some(format) => format.parse(text),
        None => DocumentFormat::Json
            .parse(text)
            .or_else(|_| DocumentFormat::Yaml.parse(text)),
    }
}

/// Read and parse a file.
pub fn read_document(path: impl AsRef<Path>) -> Result<RawDocument, DocumentError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_for_path(path, &text)
}
