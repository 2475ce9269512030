//! HTTP client for submitting runs to a remote pipeline service.

use thiserror::Error;

use crate::api::{CreateRunRequest, RunHandle};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Client for the pipeline service REST API.
pub struct SubmitClient {
    client: reqwest::Client,
    base_url: String,
}

impl SubmitClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a run from a compiled workflow.
    pub async fn create_run(&self, request: &CreateRunRequest) -> Result<RunHandle, ClientError> {
        let url = format!("{}/api/v1/runs", self.base_url);
        let resp = self.client.post(&url).json(request).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status,
                message: text,
            });
        }

        Ok(resp.json().await?)
    }

    /// Fetch the current state of a run.
    pub async fn get_run(&self, run_id: &str) -> Result<RunHandle, ClientError> {
        let url = format!("{}/api/v1/runs/{}", self.base_url, run_id);
        let resp = self.client.get(&url).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status,
                message: text,
            });
        }

        Ok(resp.json().await?)
    }
}
