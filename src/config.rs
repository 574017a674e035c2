//! Layered configuration for pipegen.
//!
//! Values are resolved in three layers, later layers winning:
//! 1. `pipegen.toml` (explicit `--config` path, else `./pipegen.toml`, else
//!    `<user config dir>/pipegen/pipegen.toml`)
//! 2. Environment variables
//! 3. CLI flags (applied by the command that needs them)
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//! allowed_origins = ["http://localhost:3000", "http://localhost:5173"]
//!
//! [llm]
//! api_base = "https://api.openai.com/v1"
//! model = "gpt-5"
//!
//! [client]
//! base_url = "http://localhost:8000"
//! ```
//!
//! # Environment
//!
//! | Variable                  | Overrides                  |
//! |---------------------------|----------------------------|
//! | `PIPEGEN_HOST`            | `server.host`              |
//! | `PIPEGEN_PORT`            | `server.port`              |
//! | `PIPEGEN_ALLOWED_ORIGINS` | `server.allowed_origins`   |
//! | `OPENAI_API_KEY`          | `llm.api_key`              |
//! | `OPENAI_BASE_URL`         | `llm.api_base`             |
//! | `PIPEGEN_MODEL`           | `llm.model`                |
//! | `PIPEGEN_API_URL`         | `client.base_url`          |

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "pipegen.toml";

/// Where the backend listens and who may call it from a browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Language model provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSection {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Usually left unset in the file and taken from `OPENAI_API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-5".to_string()
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            api_key: None,
        }
    }
}

/// Settings for the CLI front-end talking to a running service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// The full `pipegen.toml` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipegenConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub client: ClientSection,
    /// File the values were read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl PipegenConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid pipegen.toml")
    }

    /// Locate and load the config file, falling back to defaults when none
    /// exists. An explicit path that does not exist is an error.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Discover the file and apply environment overrides.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::discover(explicit)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("pipegen").join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Apply environment overrides through `lookup` so tests need not touch
    /// the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = non_empty("PIPEGEN_HOST") {
            self.server.host = host;
        }
        if let Some(port) = non_empty("PIPEGEN_PORT") {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "ignoring invalid PIPEGEN_PORT"),
            }
        }
        if let Some(origins) = non_empty("PIPEGEN_ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(base) = non_empty("OPENAI_BASE_URL") {
            self.llm.api_base = base;
        }
        if let Some(model) = non_empty("PIPEGEN_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = non_empty("PIPEGEN_API_URL") {
            self.client.base_url = url;
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Origins usable as CORS header values; invalid entries are skipped.
    pub fn cors_origins(&self) -> Vec<HeaderValue> {
        self.server
            .allowed_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect()
    }

    /// Human-readable warnings about suspicious values. Empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; the OS will pick a random port".to_string());
        }
        for origin in &self.server.allowed_origins {
            if !is_http_url(origin) || HeaderValue::from_str(origin).is_err() {
                warnings.push(format!("server.allowed_origins: '{}' is not a valid origin", origin));
            }
        }
        if self.llm.model.trim().is_empty() {
            warnings.push("llm.model is empty".to_string());
        }
        if !is_http_url(&self.llm.api_base) {
            warnings.push(format!("llm.api_base '{}' is not an http(s) URL", self.llm.api_base));
        }
        if self.llm.api_key.is_none() {
            warnings.push(
                "No language model API key configured (set OPENAI_API_KEY); generation requests will fail"
                    .to_string(),
            );
        }
        if !is_http_url(&self.client.base_url) {
            warnings.push(format!(
                "client.base_url '{}' is not an http(s) URL",
                self.client.base_url
            ));
        }

        warnings
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
