use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Story genre detected from the user prompt. Closed set: downstream
/// consumers (prompt builder, front matter) get exhaustiveness checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Fantasy,
    #[serde(rename = "sci-fi")]
    SciFi,
    Mystery,
    Horror,
    Romance,
    Adventure,
    Thriller,
    Historical,
    Comedy,
    Contemporary,
    General,
}

impl Genre {
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Fantasy => "fantasy",
            Genre::SciFi => "sci-fi",
            Genre::Mystery => "mystery",
            Genre::Horror => "horror",
            Genre::Romance => "romance",
            Genre::Adventure => "adventure",
            Genre::Thriller => "thriller",
            Genre::Historical => "historical",
            Genre::Comedy => "comedy",
            Genre::Contemporary => "contemporary",
            Genre::General => "general",
        }
    }
}

impl Default for Genre {
    fn default() -> Self {
        Genre::General
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Short,
    Medium,
    Long,
    Epic,
}

impl Length {
    pub const ALL: [Length; 4] = [Length::Short, Length::Medium, Length::Long, Length::Epic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Length::Short => "short",
            Length::Medium => "medium",
            Length::Long => "long",
            Length::Epic => "epic",
        }
    }

    /// Word-count target handed to the generation backend.
    pub fn word_count(&self) -> u32 {
        match self {
            Length::Short => 500,
            Length::Medium => 1500,
            Length::Long => 3000,
            Length::Epic => 5000,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Length::Short => "Short story (~500 words)",
            Length::Medium => "Medium story (~1500 words)",
            Length::Long => "Long story (~3000 words)",
            Length::Epic => "Epic story (~5000 words)",
        }
    }
}

impl Default for Length {
    fn default() -> Self {
        Length::Medium
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Dark,
    Light,
    Humorous,
    Dramatic,
    Mysterious,
    Neutral,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Dark => "dark",
            Tone::Light => "light",
            Tone::Humorous => "humorous",
            Tone::Dramatic => "dramatic",
            Tone::Mysterious => "mysterious",
            Tone::Neutral => "neutral",
        }
    }
}

impl Default for Tone {
    fn default() -> Self {
        Tone::Neutral
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters extracted from a user prompt. Built once by [`analyze`];
/// the interactive clarifier may overwrite `length`, `protagonist` and
/// `setting` afterwards; that mutation belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoryRequestConfig {
    pub genre: Genre,
    pub length: Length,
    pub tone: Tone,
    pub protagonist: String,
    pub setting: String,
    pub original_prompt: String,
}

// Declaration order is part of the contract: scoring ties resolve to the
// first genre in this table, and length/tone detection returns the first
// entry with any keyword hit.
const GENRE_KEYWORDS: &[(Genre, &[&str])] = &[
    (Genre::Fantasy, &["magic", "wizard", "dragon", "fairy", "enchanted", "spell", "mythical", "magical", "fantasy"]),
    (Genre::SciFi, &["space", "alien", "robot", "future", "technology", "spaceship", "laser", "cyborg", "sci-fi", "science fiction"]),
    (Genre::Mystery, &["detective", "murder", "clue", "investigation", "suspect", "crime", "mystery", "solve"]),
    (Genre::Horror, &["scary", "ghost", "monster", "haunted", "nightmare", "terror", "horror", "frightening"]),
    (Genre::Romance, &["love", "romance", "dating", "relationship", "wedding", "romantic", "heart", "couple"]),
    (Genre::Adventure, &["journey", "quest", "explore", "adventure", "treasure", "expedition", "travel"]),
    (Genre::Thriller, &["chase", "escape", "danger", "suspense", "thriller", "action", "pursuit"]),
    (Genre::Historical, &["medieval", "ancient", "historical", "century", "war", "kingdom", "empire"]),
    (Genre::Comedy, &["funny", "humor", "laugh", "joke", "comedy", "hilarious", "amusing"]),
    (Genre::Contemporary, &["modern", "today", "current", "realistic", "everyday"]),
];

const LENGTH_KEYWORDS: &[(Length, &[&str])] = &[
    (Length::Short, &["short", "brief", "quick", "flash", "micro"]),
    (Length::Medium, &["medium", "regular", "standard"]),
    (Length::Long, &["long", "detailed", "extended", "comprehensive"]),
    (Length::Epic, &["epic", "saga", "massive", "huge", "enormous"]),
];

const TONE_KEYWORDS: &[(Tone, &[&str])] = &[
    (Tone::Dark, &["dark", "grim", "serious", "somber", "tragic"]),
    (Tone::Light, &["light", "cheerful", "happy", "optimistic", "bright"]),
    (Tone::Humorous, &["funny", "humorous", "comedic", "amusing", "witty"]),
    (Tone::Dramatic, &["dramatic", "intense", "emotional", "powerful"]),
    (Tone::Mysterious, &["mysterious", "enigmatic", "cryptic", "puzzling"]),
];

// Applied in order against the original-case prompt so captures keep the
// user's casing. A capture runs until the first '.' or ',' (or end of
// string); trailing whitespace is trimmed off afterwards.
static CHARACTER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)about ((?:a |an )?[^.,]+?) who",
        r"(?i)protagonist (?:is |named |called )?([^.,]+)",
        r"(?i)main character (?:is |named |called )?([^.,]+)",
        r"(?i)story of ((?:a |an )?[^.,]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid character pattern"))
    .collect()
});

static SETTING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)set in ([^.,]+)",
        r"(?i)takes place in ([^.,]+)",
        r"(?i)located in ([^.,]+)",
        r"(?i)world of ([^.,]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid setting pattern"))
    .collect()
});

/// Extract story parameters from a free-text prompt.
///
/// Pure and total: no I/O, no shared state, and every field falls back to a
/// default when the prompt carries no signal, so this never fails.
pub fn analyze(prompt: &str) -> StoryRequestConfig {
    let lower = prompt.to_lowercase();

    StoryRequestConfig {
        genre: detect_genre(&lower),
        length: detect_length(&lower),
        tone: detect_tone(&lower),
        protagonist: extract_first(&CHARACTER_PATTERNS, prompt),
        setting: extract_first(&SETTING_PATTERNS, prompt),
        original_prompt: prompt.to_string(),
    }
}

/// True when the prompt names a length explicitly. The clarifier uses this
/// to tell a requested "medium" apart from the default.
pub fn has_length_signal(prompt: &str) -> bool {
    let lower = prompt.to_lowercase();
    LENGTH_KEYWORDS
        .iter()
        .any(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
}

fn detect_genre(lower: &str) -> Genre {
    // Each keyword contributes at most 1; matching is raw substring
    // containment, so "epicurean" hits "epic". Kept for compatibility.
    let mut best: Option<(Genre, usize)> = None;
    for (genre, keywords) in GENRE_KEYWORDS {
        let score = keywords.iter().filter(|kw| lower.contains(*kw)).count();
        if score > 0 {
            match best {
                None => best = Some((*genre, score)),
                Some((_, best_score)) if score > best_score => best = Some((*genre, score)),
                _ => {}
            }
        }
    }
    best.map(|(genre, _)| genre).unwrap_or(Genre::General)
}

fn detect_length(lower: &str) -> Length {
    LENGTH_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(length, _)| *length)
        .unwrap_or(Length::Medium)
}

fn detect_tone(lower: &str) -> Tone {
    TONE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(tone, _)| *tone)
        .unwrap_or(Tone::Neutral)
}

fn extract_first(patterns: &[Regex], prompt: &str) -> String {
    for pattern in patterns {
        if let Some(caps) = pattern.captures(prompt) {
            if let Some(m) = caps.get(1) {
                let captured = m.as_str().trim();
                if !captured.is_empty() {
                    return captured.to_string();
                }
            }
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_prompt_yields_defaults() {
        let config = analyze("");
        assert_eq!(config.genre, Genre::General);
        assert_eq!(config.length, Length::Medium);
        assert_eq!(config.tone, Tone::Neutral);
        assert_eq!(config.protagonist, "");
        assert_eq!(config.setting, "");
        assert_eq!(config.original_prompt, "");
    }

    #[test]
    fn test_fantasy_prompt_with_protagonist() {
        let config = analyze("A fantasy story about a young wizard who saves his village");
        assert_eq!(config.genre, Genre::Fantasy);
        assert_eq!(config.protagonist, "a young wizard");
        assert_eq!(config.length, Length::Medium);
        assert_eq!(config.tone, Tone::Neutral);
    }

    #[test]
    fn test_short_horror_with_setting() {
        let config = analyze("Write a short horror story set in an abandoned hospital");
        assert_eq!(config.genre, Genre::Horror);
        assert_eq!(config.length, Length::Short);
        assert_eq!(config.setting, "an abandoned hospital");
    }

    #[test]
    fn test_genre_tie_breaks_to_table_order() {
        // "magic" scores 1 for fantasy, "detective" scores 1 for mystery;
        // fantasy is declared first so it must win, every time.
        let config = analyze("a magic detective");
        assert_eq!(config.genre, Genre::Fantasy);

        // Reversed word order must not change the winner.
        let config = analyze("a detective with magic");
        assert_eq!(config.genre, Genre::Fantasy);
    }

    #[test]
    fn test_higher_score_beats_earlier_genre() {
        // mystery gets "detective" + "murder" + "clue" = 3, fantasy only
        // "magic" = 1, so the later genre wins outright.
        let config = analyze("a magic detective hunts a murder clue");
        assert_eq!(config.genre, Genre::Mystery);
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let prompt = "An epic space saga about a cyborg who dreams";
        assert_eq!(analyze(prompt), analyze(prompt));
    }

    #[test]
    fn test_substring_containment_quirk() {
        // Keyword matching is substring containment, not word-boundary:
        // "epicurean" contains "epic". Pinned on purpose.
        let config = analyze("an epicurean feast");
        assert_eq!(config.length, Length::Epic);
        assert_eq!(config.genre, Genre::General);
    }

    #[test]
    fn test_protagonist_keeps_original_casing() {
        let config = analyze("The protagonist is Eleanor Vance, a librarian");
        assert_eq!(config.protagonist, "Eleanor Vance");
    }

    #[test]
    fn test_protagonist_main_character_pattern() {
        let config = analyze("main character named Kai explores the ruins");
        assert_eq!(config.protagonist, "Kai explores the ruins");
    }

    #[test]
    fn test_protagonist_story_of_pattern() {
        let config = analyze("The story of a lighthouse keeper, alone at sea");
        assert_eq!(config.protagonist, "a lighthouse keeper");
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        // Both "about ... who" and "story of ..." could match; the
        // "about" pattern is earlier in the list.
        let config = analyze("A story of a knight about an old king who fell");
        assert_eq!(config.protagonist, "an old king");
    }

    #[test]
    fn test_setting_patterns() {
        assert_eq!(analyze("it takes place in Victorian London.").setting, "Victorian London");
        assert_eq!(analyze("a tale located in the Outback, at noon").setting, "the Outback");
        assert_eq!(analyze("the world of Glass Spires").setting, "Glass Spires");
    }

    #[test]
    fn test_setting_stops_at_punctuation() {
        let config = analyze("set in Prague, during winter");
        assert_eq!(config.setting, "Prague");
    }

    #[test]
    fn test_no_pattern_match_leaves_fields_empty() {
        let config = analyze("just something nice please");
        assert_eq!(config.protagonist, "");
        assert_eq!(config.setting, "");
    }

    #[test]
    fn test_tone_detection_order() {
        // "dark" appears in the first tone entry; "funny" would pick
        // humorous only when no earlier entry matched.
        assert_eq!(analyze("a dark and funny tale").tone, Tone::Dark);
        assert_eq!(analyze("a funny tale").tone, Tone::Humorous);
    }

    #[test]
    fn test_has_length_signal() {
        assert!(has_length_signal("a brief encounter"));
        assert!(has_length_signal("An EPIC tale"));
        assert!(!has_length_signal("a tale of two cities"));
    }

    #[test]
    fn test_enum_serialization_is_lowercase() {
        assert_eq!(serde_json::to_string(&Genre::SciFi).unwrap(), "\"sci-fi\"");
        assert_eq!(serde_json::to_string(&Length::Epic).unwrap(), "\"epic\"");
        assert_eq!(serde_json::to_string(&Tone::Neutral).unwrap(), "\"neutral\"");
    }
}
