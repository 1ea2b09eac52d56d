//! `tasks://all` resource: the complete, unfiltered task collection.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::mcp::resources::{FixedResource, ResourceMetadata};
use crate::tasks::client::TaskClient;
use crate::Result;

/// Exact URI this resource answers.
pub const URI: &str = "tasks://all";

/// Fixed resource returning every task known to the task API, verbatim.
pub struct AllTasksResource {
    client: Arc<TaskClient>,
}

impl AllTasksResource {
    /// Create the resource backed by `client`.
    #[must_use]
    pub fn new(client: Arc<TaskClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FixedResource for AllTasksResource {
    fn metadata(&self) -> ResourceMetadata {
        ResourceMetadata {
            name: "Get All Tasks".to_owned(),
            description: "Complete, unfiltered list of all tasks".to_owned(),
            uri: URI.to_owned(),
        }
    }

    async fn read(&self, _uri: &str) -> Result<Value> {
        self.client.fetch_all().await
    }
}
