//! Multi-resource operations and their outcome
//!
//! Batch commands keep going after a failed item and report every failure
//! at the end; a report with failures becomes an error.

use crate::client::Result as ClientResult;
use crate::pattern::WildcardPattern;
use crate::resources::{DeleteApi, ListApi};
use crate::types::Named;
use eyre::Result;
use owo_colors::OwoColorize;
use std::fmt::Display;

/// Outcome of a batch operation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, String)>,
    /// Items a dry run would have acted on.
    pub planned: Vec<String>,
    pub skipped: Vec<String>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeed(&mut self, item: impl Into<String>) {
        self.succeeded.push(item.into());
    }

    pub fn fail(&mut self, item: impl Into<String>, error: impl Display) {
        let item = item.into();
        log::warn!("{}: {}", item.yellow(), error);
        self.failed.push((item, error.to_string()));
    }

    pub fn plan(&mut self, item: impl Into<String>) {
        self.planned.push(item.into());
    }

    pub fn skip(&mut self, item: impl Into<String>) {
        self.skipped.push(item.into());
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Fails when any item failed, listing each failure.
    pub fn into_result(self) -> Result<Self> {
        if self.failed.is_empty() {
            return Ok(self);
        }
        let total = self.failed.len() + self.succeeded.len();
        let details = self
            .failed
            .iter()
            .map(|(item, error)| format!("  {}: {}", item, error))
            .collect::<Vec<_>>()
            .join("\n");
        eyre::bail!("{} of {} operations failed:\n{}", self.failed.len(), total, details)
    }
}

/// Names in the full listing that match `pattern`.
pub async fn matching_names<A>(api: &A, pattern: &str) -> ClientResult<Vec<String>>
where
    A: ListApi + ?Sized,
{
    let pattern = WildcardPattern::new(pattern)?;
    let listing = api.list("*").await?;
    Ok(pattern.filter(listing.iter().map(Named::name)))
}

/// Delete every resource whose name matches a wildcard pattern, one request
/// per name. A failed delete is recorded and the rest still run.
pub async fn delete_matching<A>(api: &A, pattern: &str, dry_run: bool) -> ClientResult<BatchReport>
where
    A: ListApi + DeleteApi + ?Sized,
{
    let names = matching_names(api, pattern).await?;
    if dry_run {
        let mut report = BatchReport::new();
        names.into_iter().for_each(|name| report.plan(name));
        return Ok(report);
    }
    Ok(delete_names(api, names).await)
}

/// Delete each named resource in order.
pub async fn delete_names<A>(api: &A, names: Vec<String>) -> BatchReport
where
    A: DeleteApi + ?Sized,
{
    let mut report = BatchReport::new();
    for name in names {
        match api.delete(&name).await {
            Ok(()) => report.succeed(name),
            Err(err) => report.fail(name, err),
        }
    }
    report
}
