mod analyzer;
mod cleaner;
mod config;
mod library;
mod llm;
mod request;
mod workflow;

use anyhow::Result;
use clap::Parser;
use config::{Config, API_KEY_PLACEHOLDER};
use std::path::PathBuf;
use workflow::WorkflowManager;

/// StoryCraft: prompt-first AI story generator.
#[derive(Parser, Debug)]
#[command(name = "storycraft", version, about)]
struct Args {
    /// Generate a story from this prompt directly instead of the menu
    #[arg(long)]
    prompt: Option<String>,

    /// OpenRouter API key (overrides the config file)
    #[arg(long)]
    api_key: Option<String>,

    /// Model to use (overrides the config file)
    #[arg(long)]
    model: Option<String>,

    /// Path to the configuration file
    #[arg(long, default_value = "config.yml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if !args.config.exists() {
        Config::write_template(&args.config)?;
        println!("No config file found. Template created at {}.", args.config.display());
        println!("Please edit it and add your OpenRouter API key.");
        println!("You can get one from: https://openrouter.ai/");
        return Ok(());
    }

    let mut config = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {e:#}");
            eprintln!("Please ensure '{}' contains valid LLM settings.", args.config.display());
            return Err(e);
        }
    };

    if let Some(openrouter) = config.llm.openrouter.as_mut() {
        if let Some(api_key) = args.api_key {
            openrouter.api_key = api_key;
        }
        if let Some(model) = args.model {
            openrouter.model = model;
        }

        if openrouter.api_key.is_empty() || openrouter.api_key == API_KEY_PLACEHOLDER {
            println!("No valid API key configured.");
            println!("You can get one from: https://openrouter.ai/");
            openrouter.api_key = inquire::Password::new("Enter your OpenRouter API key:")
                .without_confirmation()
                .prompt()?;
        }
    }

    config.ensure_directories()?;

    let llm = llm::create_llm(&config)?;
    let manager = WorkflowManager::new(config, llm);

    match args.prompt {
        Some(prompt) => manager.run_single_prompt(&prompt).await,
        None => manager.run().await,
    }
}
