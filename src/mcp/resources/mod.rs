//! Capability registry and the resource/template traits it dispatches.
//!
//! Capabilities are read-only units of server functionality exposed under a
//! URI. The registry is built once at server construction from explicitly
//! supplied lists and is immutable afterwards. Dispatch tries an exact match
//! against fixed resources first, then each registered template in
//! registration order — first match wins; overlapping templates are a
//! registration-time design smell, not a runtime tie-break.

pub mod all_tasks;
pub mod tasks_by_status;
pub mod uri_template;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::protocol::{Resource, ResourceContents, ResourceTemplate, MIME_JSON};
use crate::{AppError, Result};

pub use uri_template::{TemplateVariables, UriTemplate};

/// Descriptive metadata for a fixed resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMetadata {
    /// Human-readable name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Exact URI this resource answers.
    pub uri: String,
}

/// Descriptive metadata for a resource template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMetadata {
    /// Human-readable name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// URI pattern with `{name}` placeholders.
    pub uri_template: String,
}

/// A capability answering exactly one URI.
#[async_trait]
pub trait FixedResource: Send + Sync {
    /// Descriptive metadata, including the exact URI.
    fn metadata(&self) -> ResourceMetadata;

    /// Produce the resource value for `uri`.
    async fn read(&self, uri: &str) -> Result<Value>;
}

/// A capability answering a URI pattern with variable placeholders.
#[async_trait]
pub trait TemplatedResource: Send + Sync {
    /// Descriptive metadata, including the URI pattern.
    fn metadata(&self) -> TemplateMetadata;

    /// Produce the resource value for the resolved `uri` and its extracted
    /// `variables`.
    async fn read(&self, uri: &str, variables: &TemplateVariables) -> Result<Value>;
}

struct TemplateEntry {
    meta: TemplateMetadata,
    matcher: UriTemplate,
    handler: Arc<dyn TemplatedResource>,
}

/// Immutable set of all registered capabilities.
pub struct CapabilityRegistry {
    fixed: Vec<(ResourceMetadata, Arc<dyn FixedResource>)>,
    by_uri: HashMap<String, usize>,
    templates: Vec<TemplateEntry>,
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("fixed", &self.fixed.len())
            .field("templates", &self.templates.len())
            .finish()
    }
}

impl CapabilityRegistry {
    /// Build the registry from explicit capability lists, compiling every
    /// template pattern up front.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Registration` for a duplicate URI or pattern, or
    /// for a pattern that fails to compile. Structurally overlapping (but
    /// non-identical) templates are permitted and logged as a warning.
    pub fn new(
        fixed: Vec<Arc<dyn FixedResource>>,
        templated: Vec<Arc<dyn TemplatedResource>>,
    ) -> Result<Self> {
        let mut registry = Self {
            fixed: Vec::new(),
            by_uri: HashMap::new(),
            templates: Vec::new(),
        };

        for handler in fixed {
            let meta = handler.metadata();
            if registry.by_uri.contains_key(&meta.uri) {
                return Err(AppError::Registration(format!(
                    "duplicate resource uri '{}'",
                    meta.uri
                )));
            }
            registry.by_uri.insert(meta.uri.clone(), registry.fixed.len());
            registry.fixed.push((meta, handler));
        }

        for handler in templated {
            let meta = handler.metadata();
            if registry
                .templates
                .iter()
                .any(|entry| entry.meta.uri_template == meta.uri_template)
            {
                return Err(AppError::Registration(format!(
                    "duplicate resource template '{}'",
                    meta.uri_template
                )));
            }
            let matcher = UriTemplate::compile(&meta.uri_template)?;
            for existing in &registry.templates {
                if existing.matcher.overlaps(&matcher) {
                    warn!(
                        first = %existing.meta.uri_template,
                        second = %meta.uri_template,
                        "overlapping resource templates; dispatch is first-registered-wins"
                    );
                }
            }
            registry.templates.push(TemplateEntry {
                meta,
                matcher,
                handler,
            });
        }

        Ok(registry)
    }

    /// Fixed resource descriptors, in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<Resource> {
        self.fixed
            .iter()
            .map(|(meta, _)| Resource {
                uri: meta.uri.clone(),
                name: meta.name.clone(),
                description: Some(meta.description.clone()),
                mime_type: Some(MIME_JSON.to_owned()),
            })
            .collect()
    }

    /// Template descriptors, in registration order.
    #[must_use]
    pub fn list_templates(&self) -> Vec<ResourceTemplate> {
        self.templates
            .iter()
            .map(|entry| ResourceTemplate {
                uri_template: entry.meta.uri_template.clone(),
                name: entry.meta.name.clone(),
                description: Some(entry.meta.description.clone()),
                mime_type: Some(MIME_JSON.to_owned()),
            })
            .collect()
    }

    /// Resolve `uri` to a handler, invoke it, and wrap the value in the
    /// result envelope.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` when no fixed resource or template
    /// matches; handler failures propagate unchanged.
    pub async fn read(&self, uri: &str) -> Result<ResourceContents> {
        if let Some(entry) = self.by_uri.get(uri).and_then(|&index| self.fixed.get(index)) {
            let (_, handler) = entry;
            let value = handler.read(uri).await?;
            return envelope(uri, &value);
        }

        for entry in &self.templates {
            if let Some(variables) = entry.matcher.match_uri(uri) {
                let value = entry.handler.read(uri, &variables).await?;
                return envelope(uri, &value);
            }
        }

        Err(AppError::NotFound(format!(
            "no resource registered for uri '{uri}'"
        )))
    }
}

/// Wrap a handler value in the wire envelope, echoing the requested URI.
fn envelope(uri: &str, value: &Value) -> Result<ResourceContents> {
    Ok(ResourceContents {
        uri: uri.to_owned(),
        mime_type: MIME_JSON.to_owned(),
        text: serde_json::to_string(value)?,
    })
}
