//! File system layout for exported resources
//!
//! An export root holds `manifest.yaml` and one directory per resource
//! type, each containing one YAML or JSON document per resource.

mod directory;
mod manifest;

pub use directory::{DirectoryReader, DirectoryWriter, safe_file_name};
pub use manifest::{MANIFEST_FILE, ManifestDirectory};
