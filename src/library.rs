use crate::analyzer::StoryRequestConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("Invalid filename regex"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("Invalid filename regex"));

/// Front-matter record written ahead of each saved story.
#[derive(Serialize)]
struct StoryMetadata<'a> {
    generated_at: String,
    original_prompt: &'a str,
    genre: &'a crate::analyzer::Genre,
    length: &'a crate::analyzer::Length,
    tone: &'a crate::analyzer::Tone,
    protagonist: &'a str,
    setting: &'a str,
    model: &'a str,
}

pub struct StoryEntry {
    pub path: PathBuf,
    pub title: String,
    pub created: DateTime<Local>,
    pub size_kb: u64,
}

/// On-disk store of generated stories, one Markdown file each.
pub struct StoryLibrary {
    dir: PathBuf,
}

impl StoryLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn save(&self, story: &str, config: &StoryRequestConfig, model: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let now = Local::now();
        let filename = format!(
            "story_{}_{}.md",
            slug_from_prompt(&config.original_prompt),
            now.format("%Y%m%d_%H%M%S")
        );
        let path = self.dir.join(filename);

        let metadata = StoryMetadata {
            generated_at: now.to_rfc3339(),
            original_prompt: &config.original_prompt,
            genre: &config.genre,
            length: &config.length,
            tone: &config.tone,
            protagonist: &config.protagonist,
            setting: &config.setting,
            model,
        };
        let front_matter = serde_yaml_ng::to_string(&metadata)?;

        let title: String = config.original_prompt.chars().take(50).collect();
        let ellipsis = if config.original_prompt.chars().count() > 50 { "..." } else { "" };

        let content = format!(
            "---\n{front_matter}---\n\n# {title}{ellipsis}\n\n{story}\n\n---\n*Generated by StoryCraft*\n"
        );

        fs::write(&path, content)
            .with_context(|| format!("Failed to write story to {}", path.display()))?;
        log::info!("Story saved to {}", path.display());

        Ok(path)
    }

    /// Saved stories, newest first.
    pub fn list(&self) -> Result<Vec<StoryEntry>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "md") {
                let meta = fs::metadata(&path)?;
                let created: DateTime<Local> = meta.modified()?.into();
                let title = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default()
                    .trim_start_matches("story_")
                    .replace('_', " ");
                entries.push(StoryEntry {
                    title,
                    created,
                    size_kb: meta.len() / 1024,
                    path,
                });
            }
        }

        entries.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(entries)
    }

    pub fn read(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read story {}", path.display()))
    }
}

/// Filename slug from the first 30 chars of the prompt: strip anything that
/// is not a word character, collapse spaces and dashes to underscores.
fn slug_from_prompt(prompt: &str) -> String {
    let head: String = prompt.chars().take(30).collect();
    let stripped = NON_WORD.replace_all(&head, "");
    SEPARATORS.replace_all(stripped.trim(), "_").to_string()
}
