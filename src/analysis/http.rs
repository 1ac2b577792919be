//! Analysis service reached over HTTP

use super::{AnalysisRequest, Analyzer, ServiceError};
use async_trait::async_trait;
use std::time::Duration;

/// Posts each [`AnalysisRequest`] as JSON to an endpoint and returns the JSON
/// object it answers with.
pub struct HttpAnalyzer {
    client: reqwest::Client,
    endpoint: url::Url,
    api_key: Option<String>,
}

impl HttpAnalyzer {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let endpoint = url::Url::parse(endpoint).map_err(|e| ServiceError::Request {
            reason: format!("Invalid analyzer endpoint: {}", e),
        })?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Request {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }
}

#[async_trait]
impl Analyzer for HttpAnalyzer {
    async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> Result<serde_json::Value, ServiceError> {
        let mut builder = self.client.post(self.endpoint.clone()).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| ServiceError::Request {
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ServiceError::InvalidResponse {
                task: request.task.name(),
                reason: e.to_string(),
            })
    }
}
