//! HTTP client for the external task API.

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::{AppError, Result};

/// Thin wrapper over the task service REST API.
///
/// Task payloads are treated as opaque JSON; this client does not reshape
/// or validate them, and it does not retry failed calls.
#[derive(Clone, Debug)]
pub struct TaskClient {
    base_url: String,
    client: Client,
}

impl TaskClient {
    /// Create a client for the API at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client: Client::new(),
        }
    }

    /// Fetch the complete task collection.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the request fails or the API answers
    /// with a non-success status.
    pub async fn fetch_all(&self) -> Result<Value> {
        let url = format!("{}/tasks", self.base_url);
        debug!(%url, "fetching all tasks");
        self.get_json(self.client.get(&url)).await
    }

    /// Fetch one page of tasks filtered by `status`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the request fails or the API answers
    /// with a non-success status.
    pub async fn fetch_by_status(&self, status: &str, page: u32, limit: u32) -> Result<Value> {
        let url = format!("{}/tasks", self.base_url);
        debug!(%url, status, page, limit, "fetching tasks by status");
        let request = self.client.get(&url).query(&[
            ("status", status.to_owned()),
            ("page", page.to_string()),
            ("limit", limit.to_string()),
        ]);
        self.get_json(request).await
    }

    async fn get_json(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request
            .send()
            .await
            .map_err(|err| AppError::Upstream(format!("task api request failed: {err}")))?
            .error_for_status()
            .map_err(|err| AppError::Upstream(format!("task api returned error status: {err}")))?;

        response
            .json()
            .await
            .map_err(|err| AppError::Upstream(format!("task api returned invalid json: {err}")))
    }
}
