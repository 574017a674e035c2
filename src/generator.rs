//! Pipeline generation service: prompt the model, clean up its answer, and
//! decode it into the wire types.

use std::sync::Arc;

use serde::Deserialize;

use crate::errors::GenerationError;
use crate::llm::{LanguageModel, prompts};
use crate::models::{PipelineDocument, RepositoryInput, Stage};
use crate::util::{extract_json_object, strip_code_fences};

/// Strict shape the model must produce for a pipeline. Every field is
/// required; a completion missing any of them is rejected.
#[derive(Deserialize)]
struct GeneratedPipeline {
    stages: Vec<GeneratedStage>,
    summary: String,
    recommendations: Vec<String>,
}

#[derive(Deserialize)]
struct GeneratedStage {
    name: String,
    #[serde(rename = "type")]
    stage_type: String,
    description: String,
    commands: Vec<String>,
    tools: Vec<String>,
    #[serde(rename = "estimatedDuration")]
    estimated_duration: String,
}

impl From<GeneratedPipeline> for PipelineDocument {
    fn from(p: GeneratedPipeline) -> Self {
        PipelineDocument {
            stages: Some(
                p.stages
                    .into_iter()
                    .map(|s| Stage {
                        name: s.name,
                        stage_type: s.stage_type,
                        description: s.description,
                        commands: s.commands,
                        tools: s.tools,
                        estimated_duration: s.estimated_duration,
                    })
                    .collect(),
            ),
            summary: Some(p.summary),
            recommendations: Some(p.recommendations),
        }
    }
}

/// Parse model output into a JSON value.
///
/// Code fences are stripped first; if the remainder is still not JSON, the
/// outermost `{...}` object in the text is tried before giving up.
pub fn parse_model_json(content: &str) -> Result<serde_json::Value, GenerationError> {
    let cleaned = strip_code_fences(content);
    match serde_json::from_str(cleaned) {
        Ok(value) => Ok(value),
        Err(err) => match extract_json_object(cleaned) {
            Some(object) if object.len() < cleaned.len() => {
                tracing::debug!("model output had text around the JSON object");
                serde_json::from_str(object).map_err(GenerationError::InvalidJson)
            }
            _ => Err(GenerationError::InvalidJson(err)),
        },
    }
}

pub fn parse_pipeline(content: &str) -> Result<PipelineDocument, GenerationError> {
    let value = parse_model_json(content)?;
    let pipeline: GeneratedPipeline =
        serde_json::from_value(value).map_err(GenerationError::Schema)?;
    Ok(pipeline.into())
}

/// The analysis is passed through as the model wrote it; only the top-level
/// shape is checked.
pub fn parse_analysis(content: &str) -> Result<Analysis, GenerationError> {
    match parse_model_json(content)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(GenerationError::Schema(serde::de::Error::custom(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        )))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Raw analysis object returned by the analyze endpoint.
pub type Analysis = serde_json::Map<String, serde_json::Value>;

/// Runs the two service operations against a language model.
#[derive(Clone)]
pub struct PipelineGenerator {
    model: Arc<dyn LanguageModel>,
}

impl PipelineGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn generate(&self, input: &RepositoryInput) -> Result<PipelineDocument, GenerationError> {
        let request = prompts::generate_pipeline_request(input);
        let content = self.model.complete(&request).await?;
        let pipeline = parse_pipeline(&content)?;
        tracing::info!(
            stages = pipeline.stages.as_ref().map_or(0, Vec::len),
            "generated pipeline"
        );
        Ok(pipeline)
    }

    pub async fn analyze(&self, input: &RepositoryInput) -> Result<Analysis, GenerationError> {
        let request = prompts::analyze_repository_request(input);
        let content = self.model.complete(&request).await?;
        let analysis = parse_analysis(&content)?;
        let field = |key: &str| analysis.get(key).and_then(|v| v.as_str()).unwrap_or("-");
        tracing::info!(
            language = field("language"),
            framework = field("framework"),
            "analyzed repository"
        );
        Ok(analysis)
    }
}
