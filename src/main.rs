use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use console::style;
use std::path::PathBuf;

use pipegen::config::PipegenConfig;
use pipegen::render::OutputFormat;
use pipegen::ui::icons::CROSS;

mod cmd;

#[derive(Parser)]
#[command(name = "pipegen")]
#[command(version, about = "Generate test pipelines for a repository")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to pipegen.toml. Defaults to ./pipegen.toml, then the user config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Repository input shared by `generate` and `analyze`.
#[derive(Args, Clone, Debug)]
pub struct InputArgs {
    /// Repository URL
    #[arg(long)]
    pub url: Option<String>,

    /// Code content to analyze
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,

    /// Read code content from a file
    #[arg(long)]
    pub content_file: Option<PathBuf>,

    /// Programming language (auto-detected when omitted)
    #[arg(long)]
    pub language: Option<String>,

    /// Framework (auto-detected when omitted)
    #[arg(long)]
    pub framework: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline generator service
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to serve on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Generate a test pipeline for a repository
    Generate {
        #[command(flatten)]
        input: InputArgs,

        /// Detect language and framework before generating
        #[arg(long)]
        analyze_first: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Service base URL (overrides [client] base_url)
        #[arg(long, env = "PIPEGEN_API_URL")]
        server: Option<String>,
    },
    /// Detect a repository's language and framework
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Service base URL (overrides [client] base_url)
        #[arg(long, env = "PIPEGEN_API_URL")]
        server: Option<String>,
    },
    /// Check that the service is up
    Health {
        /// Service base URL (overrides [client] base_url)
        #[arg(long, env = "PIPEGEN_API_URL")]
        server: Option<String>,
    },
    /// View, validate or create configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default pipegen.toml file
    Init,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Config { command } = &cli.command {
        return cmd::cmd_config(cli.config.as_deref(), command.clone());
    }

    let config = PipegenConfig::resolve(cli.config.as_deref())?;
    let base_url = |server: &Option<String>| {
        server
            .clone()
            .unwrap_or_else(|| config.client.base_url.clone())
    };

    match &cli.command {
        Commands::Serve { host, port } => {
            cmd::cmd_serve(&config, host.clone(), *port).await?;
        }
        Commands::Generate {
            input,
            analyze_first,
            format,
            server,
        } => {
            cmd::cmd_generate(&base_url(server), input, *analyze_first, *format).await?;
        }
        Commands::Analyze {
            input,
            format,
            server,
        } => {
            cmd::cmd_analyze(&base_url(server), input, *format).await?;
        }
        Commands::Health { server } => {
            cmd::cmd_health(&base_url(server)).await?;
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("{}{}", CROSS, style(format!("{:#}", err)).red());
        std::process::exit(1);
    }
}
