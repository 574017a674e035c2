//! Configuration view and validation commands: `pipegen config`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use pipegen::config::{CONFIG_FILE_NAME, PipegenConfig};

use super::super::ConfigCommands;

fn mask(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{}****", visible)
}

fn print_effective(config: &PipegenConfig) {
    println!("[server]");
    println!("  host = \"{}\"", config.server.host);
    println!("  port = {}", config.server.port);
    println!("  allowed_origins = {:?}", config.server.allowed_origins);
    println!();
    println!("[llm]");
    println!("  api_base = \"{}\"", config.llm.api_base);
    println!("  model = \"{}\"", config.llm.model);
    match &config.llm.api_key {
        Some(key) => println!("  api_key = \"{}\"", mask(key)),
        None => println!("  api_key = (not set, export OPENAI_API_KEY)"),
    }
    println!();
    println!("[client]");
    println!("  base_url = \"{}\"", config.client.base_url);
    println!();
}

pub fn cmd_config(explicit: Option<&Path>, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            let config = PipegenConfig::resolve(explicit)?;

            println!();
            println!("Pipegen Configuration");
            println!("=====================");
            println!();
            match &config.source {
                Some(path) => println!("Config file: {}", path.display()),
                None => {
                    println!("No {} found, using defaults.", CONFIG_FILE_NAME);
                    println!("Run 'pipegen config init' to create one.");
                }
            }
            println!();
            println!("Effective values (with env overrides):");
            print_effective(&config);
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            let config = PipegenConfig::resolve(explicit)?;
            if config.source.is_none() {
                println!("No {} found. Using defaults.", CONFIG_FILE_NAME);
            }

            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            let path = explicit
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            if path.exists() {
                println!("{} already exists at {}", CONFIG_FILE_NAME, path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            PipegenConfig::default().save(&path)?;

            println!("Created {} at {}", CONFIG_FILE_NAME, path.display());
            println!();
            println!("You can now customize:");
            println!("  - [server] host, port, allowed_origins");
            println!("  - [llm] api_base, model");
            println!("  - [client] base_url");
            println!();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_keeps_only_a_prefix() {
        assert_eq!(mask("sk-abcdef123456"), "sk-a****");
        assert_eq!(mask("ab"), "ab****");
    }
}
