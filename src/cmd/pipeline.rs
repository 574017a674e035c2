//! Pipeline commands: `pipegen generate` and `pipegen analyze`.

use anyhow::{Context, Result, bail};
use console::style;

use pipegen::client::PipelineServiceClient;
use pipegen::coordinator::Coordinator;
use pipegen::errors::IntakeError;
use pipegen::intake::{FormState, IntakeForm};
use pipegen::models::AnalysisResult;
use pipegen::render::terminal::terminal_width;
use pipegen::render::{OutputFormat, format_document};
use pipegen::ui::SpinnerObserver;
use pipegen::ui::icons::SEARCH;

use super::super::InputArgs;

fn form_state(input: &InputArgs) -> Result<FormState> {
    let repository_content = match (&input.content, &input.content_file) {
        (Some(content), _) => content.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read content file: {}", path.display()))?,
        (None, None) => String::new(),
    };

    Ok(FormState {
        repository_url: input.url.clone().unwrap_or_default(),
        repository_content,
        language: input.language.clone().unwrap_or_default(),
        framework: input.framework.clone().unwrap_or_default(),
    })
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

pub async fn cmd_generate(
    base_url: &str,
    input: &InputArgs,
    analyze_first: bool,
    format: OutputFormat,
) -> Result<()> {
    let form = IntakeForm::with_state(PipelineServiceClient::new(base_url), form_state(input)?);
    let coordinator = Coordinator::new();
    let mut observer = SpinnerObserver::new(&coordinator, "Analyzing repository");

    if analyze_first {
        match form.submit_analyze(&observer).await {
            Ok(_) => {
                let state = form.state();
                eprintln!(
                    "{}Detected language {} and framework {}",
                    SEARCH,
                    style(or_dash(&state.language)).cyan(),
                    style(or_dash(&state.framework)).cyan()
                );
            }
            Err(IntakeError::Validation(message)) => bail!("{}", message),
            Err(err) => eprintln!(
                "{} analysis failed, generating without it: {}",
                style("warning:").yellow(),
                err
            ),
        }
    }

    observer.set_message("Generating pipeline");
    form.submit_generate(&observer).await?;

    let pipeline = coordinator
        .pipeline()
        .context("Service returned no pipeline")?;
    println!("{}", format_document(&pipeline, format, terminal_width())?);
    Ok(())
}

fn format_analysis(analysis: &AnalysisResult, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(analysis)?,
        OutputFormat::Yaml => serde_yaml::to_string(analysis)?,
        OutputFormat::Text => {
            let field = |value: &Option<String>| or_dash(value.as_deref().unwrap_or("")).to_string();
            let mut lines = vec![
                format!("{} {}", style("Language:").bold(), field(&analysis.language)),
                format!("{} {}", style("Framework:").bold(), field(&analysis.framework)),
                format!("{} {}", style("Project type:").bold(), field(&analysis.project_type)),
            ];
            if let Some(tools) = analysis.recommended_tools.as_ref().filter(|t| !t.is_empty()) {
                lines.push(format!(
                    "{} {}",
                    style("Recommended tools:").bold(),
                    tools.join(", ")
                ));
            }
            lines.join("\n")
        }
    })
}

pub async fn cmd_analyze(base_url: &str, input: &InputArgs, format: OutputFormat) -> Result<()> {
    let form = IntakeForm::with_state(PipelineServiceClient::new(base_url), form_state(input)?);
    let coordinator = Coordinator::new();
    let observer = SpinnerObserver::new(&coordinator, "Analyzing repository");

    let analysis = form.submit_analyze(&observer).await?;
    println!("{}", format_analysis(&analysis, format)?);
    Ok(())
}
