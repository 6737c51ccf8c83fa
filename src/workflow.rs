use crate::analyzer::{self, Genre, Length, StoryRequestConfig, Tone};
use crate::cleaner::clean_story;
use crate::config::Config;
use crate::library::StoryLibrary;
use crate::llm::LlmClient;
use crate::request::{build_story_prompt, max_tokens_for, SYSTEM_PROMPT};
use anyhow::{anyhow, Result};
use indicatif::ProgressBar;
use inquire::{Confirm, Select, Text};
use std::time::Duration;

pub struct WorkflowManager {
    config: Config,
    llm: Box<dyn LlmClient>,
    library: StoryLibrary,
}

impl WorkflowManager {
    pub fn new(config: Config, llm: Box<dyn LlmClient>) -> Self {
        let library = StoryLibrary::new(config.stories_dir.clone());
        Self { config, llm, library }
    }

    /// Interactive menu loop: generate, browse the library, or exit.
    pub async fn run(&self) -> Result<()> {
        println!("Welcome to StoryCraft!");
        println!("Just tell me what story you want, and I'll create it for you.");

        loop {
            println!();
            let choice = Select::new(
                "What would you like to do?",
                vec!["Generate a new story", "View story library", "Exit"],
            )
            .prompt()?;

            match choice {
                "Generate a new story" => {
                    if let Err(e) = self.generate_interactive().await {
                        log::error!("Story generation failed: {e:#}");
                        println!("Failed to generate story: {e:#}");
                    }
                }
                "View story library" => self.view_library()?,
                _ => {
                    println!("Happy writing! Come back anytime.");
                    break;
                }
            }
        }

        Ok(())
    }

    /// One-shot mode for `--prompt`: analyze, generate, offer to save.
    pub async fn run_single_prompt(&self, prompt: &str) -> Result<()> {
        let config = analyzer::analyze(prompt);

        println!("Generating story for: {prompt}");
        print_preview(&config);

        let story = self.generate_story(&config).await?;
        println!("\n{story}\n");

        if Confirm::new("Save this story?").with_default(true).prompt()? {
            let path = self.save(&story, &config)?;
            println!("Story saved to: {}", path.display());
        }

        Ok(())
    }

    async fn generate_interactive(&self) -> Result<()> {
        println!("Describe the story you want - be as detailed or as simple as you like!");
        println!("Examples:");
        println!("  - 'A fantasy adventure about a young wizard'");
        println!("  - 'Write a short horror story set in an abandoned hospital'");
        println!("  - 'A romantic comedy about two people who meet in a coffee shop'");

        let prompt = Text::new("What's your story idea?").prompt()?;
        if prompt.trim().is_empty() {
            println!("Please describe your story idea!");
            return Ok(());
        }

        let mut config = analyzer::analyze(&prompt);
        print_preview(&config);
        self.clarify(&mut config)?;

        let story = self.generate_story(&config).await?;
        println!("\n{story}\n");

        if Confirm::new("Save this story?").with_default(true).prompt()? {
            let path = self.save(&story, &config)?;
            println!("Story saved to: {}", path.display());
        }

        Ok(())
    }

    /// Targeted follow-up questions, only when the analysis left gaps.
    /// This is the one place the extracted record gets overwritten.
    fn clarify(&self, config: &mut StoryRequestConfig) -> Result<()> {
        if config.length == Length::Medium && !analyzer::has_length_signal(&config.original_prompt)
        {
            let options: Vec<&str> = Length::ALL.iter().map(|l| l.description()).collect();
            let picked = Select::new("How long should your story be?", options)
                .with_starting_cursor(1)
                .prompt()?;
            if let Some(length) = Length::ALL.iter().find(|l| l.description() == picked) {
                config.length = *length;
            }
        }

        if config.protagonist.is_empty()
            && config.setting.is_empty()
            && config.genre == Genre::General
        {
            let add = Confirm::new("Would you like to add more details about characters or setting?")
                .with_default(false)
                .prompt()?;
            if add {
                let protagonist = Text::new("Main character (optional):").prompt()?;
                if !protagonist.trim().is_empty() {
                    config.protagonist = protagonist.trim().to_string();
                }

                let setting = Text::new("Setting/location (optional):").prompt()?;
                if !setting.trim().is_empty() {
                    config.setting = setting.trim().to_string();
                }
            }
        }

        Ok(())
    }

    /// Build the request, call the backend with retries, clean the result.
    async fn generate_story(&self, config: &StoryRequestConfig) -> Result<String> {
        let prompt = build_story_prompt(config);
        let max_tokens = max_tokens_for(config.length);

        let spinner = ProgressBar::new_spinner();
        spinner.set_message("Crafting your story...");
        spinner.enable_steady_tick(Duration::from_millis(120));

        let result = self.chat_with_retry(&prompt, max_tokens).await;
        spinner.finish_and_clear();

        let story = result?;
        log::info!(
            "Story generated from prompt: {}...",
            config.original_prompt.chars().take(50).collect::<String>()
        );

        Ok(clean_story(&story))
    }

    async fn chat_with_retry(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let attempts = self.config.llm.retry_count + 1;
        let mut last_err = None;

        for attempt in 1..=attempts {
            match self.llm.chat(SYSTEM_PROMPT, prompt, max_tokens).await {
                Ok(story) => return Ok(story),
                Err(e) => {
                    log::warn!("Generation request failed (attempt {attempt}/{attempts}): {e:#}");
                    last_err = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(Duration::from_secs(
                            self.config.llm.retry_delay_seconds,
                        ))
                        .await;
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("Generation failed")))
    }

    fn save(&self, story: &str, config: &StoryRequestConfig) -> Result<std::path::PathBuf> {
        let model = match self.config.llm.provider.as_str() {
            "openrouter" => self
                .config
                .llm
                .openrouter
                .as_ref()
                .map(|c| c.model.as_str())
                .unwrap_or(""),
            "ollama" => self
                .config
                .llm
                .ollama
                .as_ref()
                .map(|c| c.model.as_str())
                .unwrap_or(""),
            _ => "",
        };
        self.library.save(story, config, model)
    }

    fn view_library(&self) -> Result<()> {
        let entries = self.library.list()?;

        if entries.is_empty() {
            println!("No stories found in your library yet.");
            return Ok(());
        }

        println!("\nYour Story Library ({} stories)", entries.len());
        for (i, entry) in entries.iter().enumerate() {
            println!("{}", format_entry_row(i + 1, entry));
        }

        if Confirm::new("Would you like to read one of these stories?")
            .with_default(false)
            .prompt()?
        {
            let titles: Vec<String> = entries
                .iter()
                .enumerate()
                .map(|(i, e)| format!("{}. {}", i + 1, e.title))
                .collect();
            let picked = Select::new("Which story?", titles).prompt()?;
            let index: usize = picked
                .split('.')
                .next()
                .and_then(|n| n.parse().ok())
                .map(|n: usize| n - 1)
                .unwrap_or(0);

            let content = self.library.read(&entries[index].path)?;
            println!("\n{content}");
        }

        Ok(())
    }
}

fn format_entry_row(number: usize, entry: &crate::library::StoryEntry) -> String {
    format!(
        "{:>3}. {:<41} {} {:>4}KB",
        number,
        truncate(&entry.title, 38),
        entry.created.format("%Y-%m-%d %H:%M"),
        entry.size_kb
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

fn print_preview(config: &StoryRequestConfig) {
    let mut items = Vec::new();

    if config.genre != Genre::General {
        items.push(format!("Genre: {}", config.genre));
    }
    items.push(format!("Length: {}", config.length.description()));
    if config.tone != Tone::Neutral {
        items.push(format!("Tone: {}", config.tone));
    }
    if !config.protagonist.is_empty() {
        items.push(format!("Main character: {}", config.protagonist));
    }
    if !config.setting.is_empty() {
        items.push(format!("Setting: {}", config.setting));
    }

    println!("Story plan: {}", items.join(" | "));
}
