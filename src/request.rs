use crate::analyzer::{Genre, Length, StoryRequestConfig, Tone};

/// System instruction sent with every generation request.
pub const SYSTEM_PROMPT: &str = "You are a masterful storyteller who creates \
engaging, well-structured stories. Write complete stories with compelling \
characters, vivid descriptions, and satisfying plot development.";

/// Token ceiling for a request: twice the word target, capped by the
/// backend limit.
pub fn max_tokens_for(length: Length) -> u32 {
    (length.word_count() * 2).min(4000)
}

/// Assemble the natural-language instruction sent to the generation
/// backend from the analyzed parameters and the user's original request.
pub fn build_story_prompt(config: &StoryRequestConfig) -> String {
    let mut prompt = format!(
        "Write a story based on this request: '{}'\n\n",
        config.original_prompt
    );

    if config.genre != Genre::General {
        prompt.push_str(&format!("Genre: {}\n", config.genre));
    }

    prompt.push_str(&format!("Length: {}\n", config.length.description()));

    if config.tone != Tone::Neutral {
        prompt.push_str(&format!("Tone: {}\n", config.tone));
    }

    if !config.protagonist.is_empty() {
        prompt.push_str(&format!("Main character: {}\n", config.protagonist));
    }

    if !config.setting.is_empty() {
        prompt.push_str(&format!("Setting: {}\n", config.setting));
    }

    prompt.push_str(&format!(
        "\nPlease create a complete, engaging story that fulfills this request. Make sure to:\n\
         - Create compelling characters with clear motivations\n\
         - Include vivid descriptions and engaging dialogue\n\
         - Ensure the story has a clear beginning, middle, and satisfying end\n\
         - Write approximately {} words\n\n\
         Write the story now:",
        config.length.word_count()
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;

    #[test]
    fn test_max_tokens_caps_at_backend_limit() {
        assert_eq!(max_tokens_for(Length::Short), 1000);
        assert_eq!(max_tokens_for(Length::Medium), 3000);
        assert_eq!(max_tokens_for(Length::Long), 4000);
        assert_eq!(max_tokens_for(Length::Epic), 4000);
    }

    #[test]
    fn test_prompt_carries_extracted_parameters() {
        let config = analyze("A short fantasy story about a young wizard who saves his village");
        let prompt = build_story_prompt(&config);

        assert!(prompt.contains("A short fantasy story about a young wizard"));
        assert!(prompt.contains("Genre: fantasy"));
        assert!(prompt.contains("Length: Short story (~500 words)"));
        assert!(prompt.contains("Main character: a young wizard"));
        assert!(prompt.contains("Write approximately 500 words"));
    }

    #[test]
    fn test_default_genre_and_tone_are_omitted() {
        let config = analyze("just something nice please");
        let prompt = build_story_prompt(&config);

        assert!(!prompt.contains("Genre:"));
        assert!(!prompt.contains("Tone:"));
        assert!(!prompt.contains("Main character:"));
        assert!(!prompt.contains("Setting:"));
        assert!(prompt.contains("Length: Medium story (~1500 words)"));
    }
}
