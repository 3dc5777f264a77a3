use super::{CreateApi, DeleteApi, ListApi, OK, all_if_empty, check, delete_resource, put_resource};
use crate::client::{ClientError, Result, Transport};
use crate::types::ComponentTemplate;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Deserialize)]
struct Listing {
    #[serde(default)]
    component_templates: Vec<Entry>,
}

#[derive(Deserialize)]
struct Entry {
    name: String,
    #[serde(default)]
    component_template: Map<String, Value>,
}

/// Component templates via `/_component_template`.
pub struct ComponentTemplates {
    transport: Arc<dyn Transport>,
}

impl ComponentTemplates {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn fetch(&self, pattern: &str, context: &str) -> Result<Vec<ComponentTemplate>> {
        let path = format!("/_component_template/{}", pattern);
        let response = check(self.transport.get(&path).await?, OK, context)?;
        let listing: Listing = response.json()?;
        Ok(listing
            .component_templates
            .into_iter()
            .map(|entry| ComponentTemplate {
                name: entry.name,
                body: entry.component_template,
            })
            .collect())
    }
}

#[async_trait]
impl ListApi for ComponentTemplates {
    type Resource = ComponentTemplate;

    async fn list(&self, pattern: &str) -> Result<Vec<ComponentTemplate>> {
        self.fetch(all_if_empty(pattern, "*"), "error getting component templates")
            .await
    }

    async fn get(&self, name: &str) -> Result<ComponentTemplate> {
        self.fetch(name, "error getting component template")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::not_found("component template", name))
    }
}

#[async_trait]
impl CreateApi for ComponentTemplates {
    async fn create(&self, name: &str, body: Option<&Value>) -> Result<()> {
        put_resource(
            self.transport.as_ref(),
            &format!("/_component_template/{}", name),
            body,
            "error creating component template",
        )
        .await
    }
}

#[async_trait]
impl DeleteApi for ComponentTemplates {
    async fn delete(&self, name: &str) -> Result<()> {
        delete_resource(
            self.transport.as_ref(),
            &format!("/_component_template/{}", name),
            "error deleting component template",
        )
        .await
    }
}
