//! Lifecycle policies across the ILM and ISM dialects
//!
//! Every call tries the dialects in [`Dialect::ORDER`]. The first answer that
//! does not call for a fallback wins, and its body is decoded with the shape
//! of the dialect that produced it. When every dialect falls through, the
//! last answer (status and body) becomes the error.

use super::{CREATED, CreateApi, DeleteApi, ListApi, OK, all_if_empty, check};
use crate::client::{ClientError, RawResponse, Result, Transport, is_unknown_route};
use crate::pattern::WildcardPattern;
use crate::types::LifecyclePolicy;
use async_trait::async_trait;
use owo_colors::OwoColorize;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Engine API variant for lifecycle management.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Elasticsearch index lifecycle management.
    Ilm,
    /// OpenSearch index state management.
    Ism,
}

impl Dialect {
    pub const ORDER: [Dialect; 2] = [Dialect::Ilm, Dialect::Ism];

    fn base(self) -> &'static str {
        match self {
            Self::Ilm => "/_ilm/policy",
            Self::Ism => "/_plugins/_ism/policies",
        }
    }

    fn path(self, name: &str) -> String {
        format!("{}/{}", self.base(), name)
    }

    /// ISM has no wildcard support in the path; wildcard listings fetch
    /// everything and filter client-side.
    fn list_path(self, pattern: &str) -> String {
        match self {
            Self::Ilm => self.path(all_if_empty(pattern, "*")),
            Self::Ism if WildcardPattern::is_wildcard(pattern) || pattern.trim().is_empty() => {
                self.base().to_string()
            }
            Self::Ism => self.path(pattern),
        }
    }

    fn decode_list(self, response: &RawResponse, pattern: &str) -> Result<Vec<LifecyclePolicy>> {
        match self {
            Self::Ilm => {
                let map: Map<String, Value> = response.json()?;
                map.into_iter().map(|(name, entry)| ilm_entry(name, entry)).collect()
            }
            Self::Ism => {
                let policies = ism_policies(response.json()?)?;
                let pattern = all_if_empty(pattern, "*");
                if !WildcardPattern::is_wildcard(pattern) {
                    return Ok(policies);
                }
                let matcher = WildcardPattern::new(pattern)?;
                Ok(policies
                    .into_iter()
                    .filter(|p| matcher.matches(&p.name))
                    .collect())
            }
        }
    }

    fn decode_one(self, response: &RawResponse, name: &str) -> Result<LifecyclePolicy> {
        match self {
            Self::Ilm => {
                let mut map: Map<String, Value> = response.json()?;
                let entry = map
                    .remove(name)
                    .ok_or_else(|| ClientError::not_found("lifecycle policy", name))?;
                ilm_entry(name.to_string(), entry)
            }
            Self::Ism => ism_policies(response.json()?)?
                .into_iter()
                .next()
                .map(|mut policy| {
                    if policy.name.is_empty() {
                        policy.name = name.to_string();
                    }
                    policy
                })
                .ok_or_else(|| ClientError::not_found("lifecycle policy", name)),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ilm => write!(f, "ILM"),
            Self::Ism => write!(f, "ISM"),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct IlmEntry {
    version: Option<i64>,
    modified_date: Option<String>,
    policy: Value,
}

fn ilm_entry(name: String, entry: Value) -> Result<LifecyclePolicy> {
    let entry: IlmEntry = serde_json::from_value(entry)?;
    Ok(LifecyclePolicy {
        name,
        policy: entry.policy,
        version: entry.version,
        modified_date: entry.modified_date,
    })
}

#[derive(Deserialize)]
struct IsmEntry {
    #[serde(rename = "_id", default)]
    id: String,
    #[serde(default)]
    policy: Value,
}

/// ISM answers `{policies: [{_id, policy}]}` for listings and `{_id, policy}`
/// for a single policy.
fn ism_policies(body: Value) -> Result<Vec<LifecyclePolicy>> {
    let entries: Vec<IsmEntry> = match body {
        Value::Object(mut map) if map.contains_key("policies") => {
            serde_json::from_value(map.remove("policies").unwrap_or_default())?
        }
        Value::Object(map) if map.contains_key("policy") => {
            vec![serde_json::from_value(Value::Object(map))?]
        }
        _ => Vec::new(),
    };
    Ok(entries
        .into_iter()
        .map(|e| LifecyclePolicy {
            name: e.id,
            policy: e.policy,
            version: None,
            modified_date: None,
        })
        .collect())
}

/// Whether an answer from a non-final dialect means "try the next one".
///
/// The status set is per operation. An unknown-route body counts too, since
/// both engines report an unregistered path as 400 or 405 with
/// `no handler found`.
fn should_fall_back(response: &RawResponse, statuses: &[u16]) -> bool {
    statuses.contains(&response.status)
        || (matches!(response.status, 400 | 405) && is_unknown_route(&response.text()))
}

/// Lifecycle policies, ILM first with ISM as fallback.
pub struct LifecyclePolicies {
    transport: Arc<dyn Transport>,
}

impl LifecyclePolicies {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Issue one request per dialect until an answer does not call for a
    /// fallback. Returns the dialect that produced the final answer.
    async fn resolve(
        &self,
        method: Method,
        path_for: impl Fn(Dialect) -> String + Send,
        body: Option<&Value>,
        fall_back_on: &[u16],
    ) -> Result<(Dialect, RawResponse)> {
        let order = Dialect::ORDER;
        let (last, primaries) = match order.split_last() {
            Some(split) => split,
            None => return Err(ClientError::Transport("no dialect available".to_string())),
        };

        for dialect in primaries {
            let path = path_for(*dialect);
            match self.transport.send(method.clone(), &path, body).await {
                Ok(response) if !should_fall_back(&response, fall_back_on) => {
                    return Ok((*dialect, response));
                }
                Ok(response) => log::debug!(
                    "{} answered {} for {}, trying next dialect",
                    dialect,
                    response.status.to_string().yellow(),
                    path.cyan()
                ),
                Err(e) => log::debug!("{} request failed for {}: {}", dialect, path.cyan(), e),
            }
        }

        let response = self.transport.send(method, &path_for(*last), body).await?;
        Ok((*last, response))
    }

    /// The dialect the cluster answers with, probed with a listing.
    pub async fn detect(&self) -> Result<Dialect> {
        let (dialect, response) = self
            .resolve(Method::GET, |d| d.list_path(""), None, &[404])
            .await?;
        check(response, OK, "error detecting lifecycle dialect")?;
        Ok(dialect)
    }
}

#[async_trait]
impl ListApi for LifecyclePolicies {
    type Resource = LifecyclePolicy;

    async fn list(&self, pattern: &str) -> Result<Vec<LifecyclePolicy>> {
        let (dialect, response) = self
            .resolve(Method::GET, |d| d.list_path(pattern), None, &[404])
            .await?;
        let response = check(response, OK, "error getting lifecycle policies")?;
        dialect.decode_list(&response, pattern)
    }

    async fn get(&self, name: &str) -> Result<LifecyclePolicy> {
        let (dialect, response) = self
            .resolve(Method::GET, |d| d.path(name), None, &[404])
            .await?;
        let response = check(response, OK, "error getting lifecycle policy")?;
        dialect.decode_one(&response, name)
    }
}

#[async_trait]
impl CreateApi for LifecyclePolicies {
    /// `body` is `{"policy": {...}}` in either dialect.
    async fn create(&self, name: &str, body: Option<&Value>) -> Result<()> {
        let (dialect, response) = self
            .resolve(Method::PUT, |d| d.path(name), body, &[404, 405])
            .await?;
        check(response, CREATED, "error creating lifecycle policy")?;
        log::debug!("Lifecycle policy {} written via {}", name.cyan(), dialect);
        Ok(())
    }
}

#[async_trait]
impl DeleteApi for LifecyclePolicies {
    async fn delete(&self, name: &str) -> Result<()> {
        let (_, response) = self
            .resolve(Method::DELETE, |d| d.path(name), None, &[404])
            .await?;
        check(response, OK, "error deleting lifecycle policy")?;
        Ok(())
    }
}
