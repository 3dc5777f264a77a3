//! searchctl
//!
//! A kubectl-style administration client for Elasticsearch and OpenSearch
//! clusters, built on a [`Clientset`] of per-resource sub-clients over one
//! shared transport.

pub mod batch;
pub mod cli;
pub mod client;
pub mod clone;
pub mod config;
pub mod document;
pub mod etl;
pub mod output;
pub mod pattern;
pub mod resources;
pub mod rollover;
pub mod storage;
pub mod types;

// Re-exports for convenience
pub use client::{Auth, ClientError, Clientset, ConnectionSettings, Transport};
pub use document::{DocumentError, ManifestEnvelope, ResourceKind};
pub use etl::{Extractor, Loader, Pipeline, Transformer};
pub use storage::{DirectoryReader, DirectoryWriter, ManifestDirectory};
