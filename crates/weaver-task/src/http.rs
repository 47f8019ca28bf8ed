use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;

use crate::client::{TaskClient, TaskHandle, TaskSnapshot};
use crate::error::TaskError;
use crate::status::RunStatus;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response to a trigger request.
#[derive(Debug, Deserialize)]
struct TriggerResponse {
  id: String,
}

/// Run as reported by the task service.
#[derive(Debug, Deserialize)]
struct RunResponse {
  status: RunStatus,
  #[serde(default)]
  output: Option<serde_json::Value>,
  #[serde(default)]
  error: Option<serde_json::Value>,
}

/// [`TaskClient`] for an HTTP task service.
///
/// - `POST {base}/api/v1/tasks/{task}/trigger` with `{"payload": ...}`
///   returns `{"id": "<run id>"}`
/// - `GET {base}/api/v3/runs/{id}` returns
///   `{"status": "...", "output": ..., "error": {"message": "..."}}`
#[derive(Debug, Clone)]
pub struct HttpTaskClient {
  client: Client,
  base_url: String,
  api_key: Option<String>,
}

impl HttpTaskClient {
  /// Client with a per-request timeout.
  pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, TaskError> {
    let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    Ok(Self::with_client(client, base_url, api_key))
  }

  pub fn with_client(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
    let base_url = base_url.into().trim_end_matches('/').to_string();
    Self {
      client,
      base_url,
      api_key,
    }
  }

  fn trigger_url(&self, task_name: &str) -> String {
    format!("{}/api/v1/tasks/{}/trigger", self.base_url, task_name)
  }

  fn run_url(&self, run_id: &str) -> String {
    format!("{}/api/v3/runs/{}", self.base_url, run_id)
  }

  fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
    match &self.api_key {
      Some(key) => request.bearer_auth(key),
      None => request,
    }
  }
}

#[async_trait]
impl TaskClient for HttpTaskClient {
  async fn submit(
    &self,
    task_name: &str,
    payload: serde_json::Value,
  ) -> Result<TaskHandle, TaskError> {
    let request = self
      .client
      .post(self.trigger_url(task_name))
      .json(&serde_json::json!({ "payload": payload }));

    let response = self.authorize(request).send().await?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(TaskError::Submit {
        task_name: task_name.to_string(),
        message: format!("{}: {}", status, body),
      });
    }

    let trigger: TriggerResponse = response.json().await?;
    Ok(TaskHandle {
      run_id: trigger.id,
      task_name: task_name.to_string(),
    })
  }

  async fn poll_status(&self, handle: &TaskHandle) -> Result<TaskSnapshot, TaskError> {
    let request = self.client.get(self.run_url(&handle.run_id));

    let response = self.authorize(request).send().await?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(TaskError::Poll {
        run_id: handle.run_id.clone(),
        message: format!("{}: {}", status, body),
      });
    }

    let run: RunResponse = response.json().await?;
    Ok(TaskSnapshot {
      status: run.status,
      output: run.output,
      error: run.error.map(error_message),
    })
  }
}

/// Runs report errors either as a string or as `{"message": ...}`.
fn error_message(error: serde_json::Value) -> String {
  match error {
    serde_json::Value::String(message) => message,
    other => other
      .get("message")
      .and_then(|m| m.as_str())
      .map(str::to_string)
      .unwrap_or_else(|| other.to_string()),
  }
}
