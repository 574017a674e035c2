//! Client for the pipeline service endpoints.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::errors::ClientError;
use crate::intake::FormState;
use crate::models::{AnalysisResult, HealthStatus, PipelineDocument};

pub const GENERATE_PATH: &str = "/api/generate-pipeline";
pub const ANALYZE_PATH: &str = "/api/analyze-repository";
pub const HEALTH_PATH: &str = "/health";

/// The two request/response exchanges the intake form depends on.
///
/// Implementations are stateless: concurrent calls are independent and no
/// ordering between them is enforced.
#[async_trait]
pub trait PipelineService: Send + Sync {
    async fn analyze_repository(&self, form: &FormState) -> Result<AnalysisResult, ClientError>;

    async fn generate_pipeline(&self, form: &FormState) -> Result<PipelineDocument, ClientError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// HTTP implementation of [`PipelineService`] backed by `reqwest`.
#[derive(Clone)]
pub struct PipelineServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl PipelineServiceClient {
    /// # Arguments
    ///
    /// * `base_url` - Service root, e.g. "http://localhost:8000". A trailing
    ///   slash is ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let resp = self.client.get(self.url(HEALTH_PATH)).send().await?;
        read_json(resp).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, form: &FormState) -> Result<T, ClientError> {
        tracing::debug!(url = %self.url(path), "posting form");
        let resp = self.client.post(self.url(path)).json(form).send().await?;
        read_json(resp).await
    }
}

/// Decode a success body, or turn a non-2xx response into
/// [`ClientError::Status`] carrying the body's `detail` string if present.
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    let bytes = resp.bytes().await?;

    if !status.is_success() {
        let detail = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.detail.as_str().map(str::to_string));
        tracing::debug!(status = status.as_u16(), ?detail, "service returned an error");
        return Err(ClientError::Status {
            status: status.as_u16(),
            detail,
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

#[async_trait]
impl PipelineService for PipelineServiceClient {
    async fn analyze_repository(&self, form: &FormState) -> Result<AnalysisResult, ClientError> {
        self.post(ANALYZE_PATH, form).await
    }

    async fn generate_pipeline(&self, form: &FormState) -> Result<PipelineDocument, ClientError> {
        self.post(GENERATE_PATH, form).await
    }
}
