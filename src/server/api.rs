use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use crate::errors::GenerationError;
use crate::generator::PipelineGenerator;
use crate::models::{HealthStatus, RepositoryInput};

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub generator: PipelineGenerator,
}

pub type SharedState = Arc<AppState>;

#[derive(Serialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
}

// ── Error handling ────────────────────────────────────────────────────

/// Every failure leaves the service as `{"detail": "<message>"}`.
#[derive(Debug)]
pub enum ApiError {
    InvalidBody { status: StatusCode, message: String },
    Internal(String),
}

impl ApiError {
    fn from_generation(err: GenerationError) -> Self {
        let detail = match &err {
            GenerationError::InvalidJson(e) => format!("Failed to parse AI response: {}", e),
            other => format!("Error generating pipeline: {}", other),
        };
        tracing::error!(error = %err, "pipeline generation failed");
        ApiError::Internal(detail)
    }

    fn from_analysis(err: GenerationError) -> Self {
        tracing::error!(error = %err, "repository analysis failed");
        ApiError::Internal(format!("Error analyzing repository: {}", err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::InvalidBody { status, message } => (status, message),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .route("/api/generate-pipeline", post(generate_pipeline))
        .route("/api/analyze-repository", post(analyze_repository))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Test Pipeline Generator API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus::healthy())
}

async fn generate_pipeline(
    State(state): State<SharedState>,
    body: Result<Json<RepositoryInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = body?;
    let pipeline = state
        .generator
        .generate(&input)
        .await
        .map_err(ApiError::from_generation)?;
    Ok(Json(pipeline))
}

async fn analyze_repository(
    State(state): State<SharedState>,
    body: Result<Json<RepositoryInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = body?;
    let analysis = state
        .generator
        .analyze(&input)
        .await
        .map_err(ApiError::from_analysis)?;
    Ok(Json(analysis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatRequest, LanguageModel};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// Answers generate prompts with `pipeline` and analyze prompts with
    /// `analysis`, telling them apart by token budget.
    struct ScriptedModel {
        pipeline: Result<String, String>,
        analysis: Result<String, String>,
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, request: &ChatRequest) -> Result<String, GenerationError> {
            let reply = if request.max_tokens == crate::llm::prompts::GENERATE_MAX_TOKENS {
                &self.pipeline
            } else {
                &self.analysis
            };
            reply.clone().map_err(|message| GenerationError::Provider {
                status: 503,
                message,
            })
        }
    }

    fn test_app(pipeline: Result<&str, &str>, analysis: Result<&str, &str>) -> Router {
        let model = ScriptedModel {
            pipeline: pipeline.map(String::from).map_err(String::from),
            analysis: analysis.map(String::from).map_err(String::from),
        };
        let state = Arc::new(AppState {
            generator: PipelineGenerator::new(Arc::new(model)),
        });
        api_router().with_state(state)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    const PIPELINE: &str = r#"{"stages": [{"name": "Lint", "type": "code_quality",
        "description": "Static analysis", "commands": ["ruff ."], "tools": ["ruff"],
        "estimatedDuration": "2m"}], "summary": "Quick checks", "recommendations": ["Add tests"]}"#;

    fn full_input() -> serde_json::Value {
        serde_json::json!({
            "repository_url": "https://github.com/user/repo",
            "repository_content": "",
            "language": "",
            "framework": ""
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = test_app(Ok(PIPELINE), Ok("{}"));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response.into_body()).await, serde_json::json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn test_root_reports_name_and_version() {
        let app = test_app(Ok(PIPELINE), Ok("{}"));
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        let info = body_json(response.into_body()).await;
        assert_eq!(info["message"], "Test Pipeline Generator API");
        assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_generate_pipeline_success() {
        let app = test_app(Ok(PIPELINE), Ok("{}"));

        let response = app
            .oneshot(post_json("/api/generate-pipeline", full_input()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let pipeline = body_json(response.into_body()).await;
        assert_eq!(pipeline["stages"][0]["name"], "Lint");
        assert_eq!(pipeline["stages"][0]["type"], "code_quality");
        assert_eq!(pipeline["stages"][0]["estimatedDuration"], "2m");
        assert_eq!(pipeline["summary"], "Quick checks");
        assert_eq!(pipeline["recommendations"][0], "Add tests");
    }

    #[tokio::test]
    async fn test_generate_pipeline_accepts_empty_object() {
        let app = test_app(Ok(PIPELINE), Ok("{}"));
        let response = app
            .oneshot(post_json("/api/generate-pipeline", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_generate_pipeline_unparseable_model_output() {
        let app = test_app(Ok("this is not json"), Ok("{}"));

        let response = app
            .oneshot(post_json("/api/generate-pipeline", full_input()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response.into_body()).await;
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("Failed to parse AI response: "), "{}", detail);
    }

    #[tokio::test]
    async fn test_generate_pipeline_schema_mismatch() {
        let app = test_app(Ok(r#"{"stages": []}"#), Ok("{}"));

        let response = app
            .oneshot(post_json("/api/generate-pipeline", full_input()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response.into_body()).await;
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("Error generating pipeline: "), "{}", detail);
    }

    #[tokio::test]
    async fn test_generate_pipeline_provider_failure() {
        let app = test_app(Err("upstream overloaded"), Ok("{}"));

        let response = app
            .oneshot(post_json("/api/generate-pipeline", full_input()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response.into_body()).await;
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("Error generating pipeline: "));
        assert!(detail.contains("upstream overloaded"));
    }

    #[tokio::test]
    async fn test_generate_pipeline_malformed_body_is_client_error() {
        let app = test_app(Ok(PIPELINE), Ok("{}"));
        let request = Request::builder()
            .method("POST")
            .uri("/api/generate-pipeline")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());
        let body = body_json(response.into_body()).await;
        assert!(body["detail"].as_str().is_some_and(|d| !d.is_empty()));
    }

    #[tokio::test]
    async fn test_generate_pipeline_wrong_field_type_is_unprocessable() {
        let app = test_app(Ok(PIPELINE), Ok("{}"));
        let response = app
            .oneshot(post_json(
                "/api/generate-pipeline",
                serde_json::json!({"repository_url": 42}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_generate_pipeline_get_not_allowed() {
        let app = test_app(Ok(PIPELINE), Ok("{}"));
        let request = Request::builder()
            .uri("/api/generate-pipeline")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_analyze_repository_success_passes_through_extra_keys() {
        let app = test_app(
            Ok(PIPELINE),
            Ok(r#"{"language": "Python", "framework": "FastAPI", "projectType": "API",
                "recommendedTools": ["pytest"], "notes": "monorepo"}"#),
        );

        let response = app
            .oneshot(post_json("/api/analyze-repository", full_input()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let analysis = body_json(response.into_body()).await;
        assert_eq!(analysis["language"], "Python");
        assert_eq!(analysis["framework"], "FastAPI");
        assert_eq!(analysis["projectType"], "API");
        assert_eq!(analysis["recommendedTools"][0], "pytest");
        assert_eq!(analysis["notes"], "monorepo");
    }

    #[tokio::test]
    async fn test_analyze_repository_returns_misshapen_fields_unchanged() {
        let app = test_app(
            Ok(PIPELINE),
            Ok(r#"{"language": "Python", "framework": "FastAPI", "projectType": "API",
                "recommendedTools": "pytest"}"#),
        );

        let response = app
            .oneshot(post_json("/api/analyze-repository", full_input()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let analysis = body_json(response.into_body()).await;
        assert_eq!(analysis["language"], "Python");
        assert_eq!(analysis["recommendedTools"], "pytest");
    }

    #[tokio::test]
    async fn test_analyze_repository_failure_detail() {
        let app = test_app(Ok(PIPELINE), Ok("garbage"));

        let response = app
            .oneshot(post_json("/api/analyze-repository", full_input()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response.into_body()).await;
        assert!(
            body["detail"]
                .as_str()
                .unwrap()
                .starts_with("Error analyzing repository: ")
        );
    }
}
