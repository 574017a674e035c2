//! Pipeline renderer: turns a [`PipelineDocument`] into a display tree.
//!
//! [`render`] is pure; the same document always yields the same tree, so
//! callers can re-render on every state change. Turning the tree into text
//! is the job of [`terminal`].

pub mod terminal;

use crate::models::{PipelineDocument, Stage, StageKind};

pub use terminal::{OutputFormat, format_document, format_pipeline};

pub const DURATION_LABEL: &str = "Estimated Duration: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayTree {
    /// No pipeline, or a pipeline without `stages`.
    Empty,
    Pipeline {
        stages: Vec<StageView>,
        summary: Option<SummaryView>,
    },
}

impl DisplayTree {
    pub fn is_empty(&self) -> bool {
        matches!(self, DisplayTree::Empty)
    }

    pub fn stages(&self) -> &[StageView] {
        match self {
            DisplayTree::Empty => &[],
            DisplayTree::Pipeline { stages, .. } => stages,
        }
    }

    pub fn summary(&self) -> Option<&SummaryView> {
        match self {
            DisplayTree::Empty => None,
            DisplayTree::Pipeline { summary, .. } => summary.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageView {
    pub icon: StageKind,
    pub name: String,
    pub label: String,
    pub description: String,
    pub commands: Vec<String>,
    pub tools: Vec<String>,
    /// Already prefixed with [`DURATION_LABEL`].
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub text: String,
    pub recommendations: Vec<String>,
}

/// Icon for a stage type tag. Unknown tags get the code-quality icon.
pub fn icon_for(stage_type: &str) -> StageKind {
    match stage_type {
        "unit_test_backend" => StageKind::UnitTestBackend,
        "unit_test_frontend" => StageKind::UnitTestFrontend,
        "integration_test_backend" => StageKind::IntegrationTestBackend,
        "integration_test_frontend" => StageKind::IntegrationTestFrontend,
        "code_quality" => StageKind::CodeQuality,
        "performance_test" => StageKind::PerformanceTest,
        "security_test" => StageKind::SecurityTest,
        _ => StageKind::CodeQuality,
    }
}

/// Human label for a type tag: underscores become spaces, nothing else changes.
pub fn stage_label(stage_type: &str) -> String {
    stage_type.replace('_', " ")
}

fn stage_view(stage: &Stage) -> StageView {
    StageView {
        icon: icon_for(&stage.stage_type),
        name: stage.name.clone(),
        label: stage_label(&stage.stage_type),
        description: stage.description.clone(),
        commands: stage.commands.clone(),
        tools: stage.tools.clone(),
        duration: format!("{}{}", DURATION_LABEL, stage.estimated_duration),
    }
}

pub fn render(pipeline: Option<&PipelineDocument>) -> DisplayTree {
    let Some(pipeline) = pipeline else {
        return DisplayTree::Empty;
    };
    let Some(stages) = pipeline.stages.as_ref() else {
        return DisplayTree::Empty;
    };

    let summary = pipeline
        .summary
        .as_deref()
        .filter(|text| !text.is_empty())
        .map(|text| SummaryView {
            text: text.to_string(),
            recommendations: pipeline.recommendations.clone().unwrap_or_default(),
        });

    DisplayTree::Pipeline {
        stages: stages.iter().map(stage_view).collect(),
        summary,
    }
}
