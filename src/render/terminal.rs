use clap::ValueEnum;
use console::style;

use super::{DisplayTree, StageView, SummaryView, render};
use crate::models::PipelineDocument;
use crate::ui::icons::{CLOCK, SPARKLE, stage_icon};

const MIN_WIDTH: usize = 40;
const DEFAULT_WIDTH: usize = 80;
const INDENT: &str = "   ";

/// How a generated pipeline is printed.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Styled, human-readable text
    #[default]
    Text,
    /// The pipeline document as pretty JSON
    Json,
    /// The pipeline document as YAML
    Yaml,
}

/// Width of the attached terminal, or 80 columns when there is none.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(width, _)| width.0 as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

fn wrap(text: &str, width: usize, indent: &str) -> String {
    let options = textwrap::Options::new(width)
        .initial_indent(indent)
        .subsequent_indent(indent);
    textwrap::fill(text, options)
}

fn push_stage(out: &mut Vec<String>, index: usize, stage: &StageView, width: usize) {
    out.push(format!(
        "{}. {}{}  {}",
        index + 1,
        stage_icon(stage.icon),
        style(&stage.name).bold(),
        style(format!("[{}]", stage.label)).cyan()
    ));
    if !stage.description.is_empty() {
        out.push(wrap(&stage.description, width, INDENT));
    }
    if !stage.commands.is_empty() {
        out.push(format!("{}{}", INDENT, style("Commands:").dim()));
        for command in &stage.commands {
            out.push(format!("{}  $ {}", INDENT, style(command).green()));
        }
    }
    if !stage.tools.is_empty() {
        out.push(format!(
            "{}{} {}",
            INDENT,
            style("Tools:").dim(),
            stage.tools.join(", ")
        ));
    }
    out.push(format!("{}{}{}", INDENT, CLOCK, style(&stage.duration).dim()));
}

fn push_summary(out: &mut Vec<String>, summary: &SummaryView, width: usize) {
    out.push(format!("{}{}", SPARKLE, style("Summary").bold().underlined()));
    out.push(wrap(&summary.text, width, INDENT));
    if !summary.recommendations.is_empty() {
        out.push(String::new());
        out.push(format!("{}{}", INDENT, style("Recommendations:").bold()));
        for (i, rec) in summary.recommendations.iter().enumerate() {
            let marker = format!("{}  {}. ", INDENT, i + 1);
            let hang = " ".repeat(marker.len());
            let options = textwrap::Options::new(width)
                .initial_indent(&marker)
                .subsequent_indent(&hang);
            out.push(textwrap::fill(rec, options));
        }
    }
}

/// Format a display tree for the terminal. An empty tree formats as an
/// empty string.
pub fn format_pipeline(tree: &DisplayTree, width: usize) -> String {
    let DisplayTree::Pipeline { stages, summary } = tree else {
        return String::new();
    };
    let width = width.max(MIN_WIDTH);

    let mut out = vec![
        style("Generated Test Pipeline").bold().to_string(),
        String::new(),
    ];
    if stages.is_empty() {
        out.push(style("(no stages)").dim().to_string());
    }
    for (i, stage) in stages.iter().enumerate() {
        push_stage(&mut out, i, stage, width);
        out.push(String::new());
    }
    if let Some(summary) = summary {
        push_summary(&mut out, summary, width);
    }

    let mut text = out.join("\n");
    text.truncate(text.trim_end().len());
    text
}

/// Format a pipeline document in the requested output format.
pub fn format_document(
    pipeline: &PipelineDocument,
    format: OutputFormat,
    width: usize,
) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => format_pipeline(&render(Some(pipeline)), width),
        OutputFormat::Json => serde_json::to_string_pretty(pipeline)?,
        OutputFormat::Yaml => serde_yaml::to_string(pipeline)?,
    })
}
