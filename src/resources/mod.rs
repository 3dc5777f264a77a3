//! Resource sub-clients
//!
//! Each resource family wraps the shared [`Transport`] with its endpoint
//! layout and response decoding:
//!
//! - [`Cluster`] - health, info, settings, shards, allocation, state
//! - [`Indices`] - `_cat/indices` plus index create/delete
//! - [`IndexTemplates`] and [`ComponentTemplates`]
//! - [`LifecyclePolicies`] - ILM with ISM fallback
//! - [`DataStreams`] - including rollover
//! - [`Nodes`] - `_cat/nodes` with client-side selection
//! - [`Ingest`] - ingest pipelines
//!
//! Families with a full list/get/create/delete contract implement
//! [`ListApi`], [`CreateApi`] and [`DeleteApi`].

mod cluster;
mod component_templates;
mod data_streams;
mod index_templates;
mod indices;
mod ingest;
mod lifecycle_policies;
mod nodes;

pub use cluster::Cluster;
pub use component_templates::ComponentTemplates;
pub use data_streams::DataStreams;
pub use index_templates::IndexTemplates;
pub use indices::Indices;
pub use ingest::Ingest;
pub use lifecycle_policies::{Dialect, LifecyclePolicies};
pub use nodes::{
    NODE_COLUMNS, NODE_WIDE_COLUMNS, NodeSelector, Nodes, SortKey, column_value, has_role,
    parse_columns,
};

use crate::client::{ClientError, RawResponse, Result, Transport};
use crate::types::Named;
use async_trait::async_trait;
use serde_json::Value;

/// Read access to a resource family.
#[async_trait]
pub trait ListApi: Send + Sync {
    type Resource: Named + Send;

    /// All resources matching `pattern`. `""` and `"*"` both mean all.
    async fn list(&self, pattern: &str) -> Result<Vec<Self::Resource>>;

    /// The resource named exactly `name`.
    async fn get(&self, name: &str) -> Result<Self::Resource>;
}

/// Create-or-update access. Both 200 and 201 are success.
#[async_trait]
pub trait CreateApi: Send + Sync {
    async fn create(&self, name: &str, body: Option<&Value>) -> Result<()>;
}

#[async_trait]
pub trait DeleteApi: Send + Sync {
    async fn delete(&self, name: &str) -> Result<()>;
}

/// Statuses accepted by create calls.
pub(crate) const CREATED: &[u16] = &[200, 201];
/// Statuses accepted by everything else.
pub(crate) const OK: &[u16] = &[200];

/// Replace an empty or bare-wildcard pattern with the family's own "all"
/// spelling, so `list("")` and `list("*")` issue the same request.
pub(crate) fn all_if_empty<'a>(pattern: &'a str, all: &'a str) -> &'a str {
    match pattern.trim() {
        "" | "*" => all,
        _ => pattern,
    }
}

/// Turn an unaccepted status into a [`ClientError::Status`] carrying the raw body.
pub(crate) fn check(response: RawResponse, accepted: &[u16], context: &str) -> Result<RawResponse> {
    if accepted.contains(&response.status) {
        Ok(response)
    } else {
        Err(ClientError::status(response.status, context, response.text()))
    }
}

/// Exact-name scan over a listing.
pub(crate) fn find_exact<T: Named>(items: Vec<T>, name: &str, kind: &'static str) -> Result<T> {
    items
        .into_iter()
        .find(|item| item.name() == name)
        .ok_or_else(|| ClientError::not_found(kind, name))
}

/// Shared helper for the simple PUT-or-DELETE families.
pub(crate) async fn put_resource(
    transport: &dyn Transport,
    path: &str,
    body: Option<&Value>,
    context: &str,
) -> Result<()> {
    let response = transport.put(path, body).await?;
    check(response, CREATED, context)?;
    Ok(())
}

pub(crate) async fn delete_resource(transport: &dyn Transport, path: &str, context: &str) -> Result<()> {
    let response = transport.delete(path).await?;
    check(response, OK, context)?;
    Ok(())
}
