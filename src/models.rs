//! Wire types shared by the pipeline service, its client, and the renderer.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Decode an explicit `null` the same way as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept any JSON value; one that does not fit `T` decodes as `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Request body accepted by both service endpoints.
///
/// Every field may be absent or `null`; the prompt builders treat empty
/// strings the same as missing values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryInput {
    #[serde(default)]
    pub repository_url: Option<String>,
    #[serde(default)]
    pub repository_content: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub framework: Option<String>,
}

/// One step of a generated test pipeline.
///
/// Decoding is lenient: a stage with missing or `null` fields still renders,
/// with the gaps left empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub stage_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub commands: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tools: Vec<String>,
    #[serde(
        rename = "estimatedDuration",
        default,
        deserialize_with = "null_as_default"
    )]
    pub estimated_duration: String,
}

/// The generated pipeline as returned by `POST /api/generate-pipeline`.
///
/// `stages` is optional on purpose: a document without it is "no pipeline"
/// and renders as nothing, while `stages: []` renders an empty container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<Stage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
}

/// Response of `POST /api/analyze-repository`.
///
/// Only `language` and `framework` feed back into the intake form. Keys the
/// model adds beyond the documented ones are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(
        rename = "projectType",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub project_type: Option<String>,
    #[serde(
        rename = "recommendedTools",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub recommended_tools: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// The stage categories the generator is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    UnitTestBackend,
    UnitTestFrontend,
    IntegrationTestBackend,
    IntegrationTestFrontend,
    CodeQuality,
    PerformanceTest,
    SecurityTest,
}

impl StageKind {
    pub const ALL: [StageKind; 7] = [
        StageKind::UnitTestBackend,
        StageKind::UnitTestFrontend,
        StageKind::IntegrationTestBackend,
        StageKind::IntegrationTestFrontend,
        StageKind::CodeQuality,
        StageKind::PerformanceTest,
        StageKind::SecurityTest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnitTestBackend => "unit_test_backend",
            Self::UnitTestFrontend => "unit_test_frontend",
            Self::IntegrationTestBackend => "integration_test_backend",
            Self::IntegrationTestFrontend => "integration_test_frontend",
            Self::CodeQuality => "code_quality",
            Self::PerformanceTest => "performance_test",
            Self::SecurityTest => "security_test",
        }
    }
}
