//! `tasks://status/{status}` resource template: tasks filtered by status.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::mcp::resources::{TemplateMetadata, TemplateVariables, TemplatedResource};
use crate::tasks::client::TaskClient;
use crate::{AppError, Result};

/// URI pattern this template answers. The query form
/// `tasks://status?status=<value>` matches the same template.
pub const URI_TEMPLATE: &str = "tasks://status/{status}";

/// Page size requested from the task API. The API paginates; one page of
/// this size is treated as the full filtered collection.
pub const PAGE_LIMIT: u32 = 100;

/// Resource template returning tasks with a given status.
///
/// The bound status value is passed through to the task API unvalidated —
/// an unknown value surfaces as an upstream failure, not a template error.
pub struct TasksByStatusResource {
    client: Arc<TaskClient>,
}

impl TasksByStatusResource {
    /// Create the template backed by `client`.
    #[must_use]
    pub fn new(client: Arc<TaskClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TemplatedResource for TasksByStatusResource {
    fn metadata(&self) -> TemplateMetadata {
        TemplateMetadata {
            name: "Get Tasks By Status".to_owned(),
            description: "Tasks filtered by status. Valid values: \"todo\", \"in_progress\", \
                          \"completed\". Example URI: tasks://status/todo"
                .to_owned(),
            uri_template: URI_TEMPLATE.to_owned(),
        }
    }

    async fn read(&self, _uri: &str, variables: &TemplateVariables) -> Result<Value> {
        let status = variables
            .get("status")
            .and_then(|values| values.first())
            .ok_or_else(|| {
                AppError::Internal("template matched without a 'status' binding".into())
            })?;
        debug!(status = %status, "fetching tasks by status");
        self.client.fetch_by_status(status, 1, PAGE_LIMIT).await
    }
}
