use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_MODEL: &str = "sarvamai/sarvam-m:free";
pub const API_KEY_PLACEHOLDER: &str = "your-api-key-here";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_stories_dir")]
    pub stories_dir: String,

    pub llm: LlmConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    pub provider: String, // "openrouter" or "ollama"
    #[serde(default = "default_retry_count")]
    pub retry_count: usize,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_seconds: u64,
    pub openrouter: Option<OpenRouterConfig>,
    pub ollama: Option<OllamaConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenRouterConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
}

fn default_stories_dir() -> String {
    "generated_stories".to_string()
}
fn default_retry_count() -> usize {
    3
}
fn default_retry_delay() -> u64 {
    10
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Write a starter config for first runs so the user only has to fill
    /// in the API key.
    pub fn write_template(path: &Path) -> Result<()> {
        let template = Config {
            stories_dir: default_stories_dir(),
            llm: LlmConfig {
                provider: "openrouter".to_string(),
                retry_count: default_retry_count(),
                retry_delay_seconds: default_retry_delay(),
                openrouter: Some(OpenRouterConfig {
                    api_key: API_KEY_PLACEHOLDER.to_string(),
                    model: default_model(),
                    base_url: None,
                }),
                ollama: None,
            },
        };
        template.save(path)
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.stories_dir)?;
        Ok(())
    }
}
