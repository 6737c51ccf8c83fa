/// Markers that identify LLM planning/reasoning chatter at the top of a
/// generated story ("Okay, the user wants...", "Let me draft...").
/// Lower-cased; matched by containment against each lower-cased line.
const PLANNING_MARKERS: &[&str] = &[
    "check for",
    "ensure",
    "avoid",
    "keep",
    "let me",
    "maybe",
    "wait",
    "since",
    "stick to",
    "okay",
    "first",
    "i need",
    "the main",
    "themes:",
    "plot",
    "vivid",
    "dialogue",
    "ending:",
    "need to",
    "make sure",
    "step by step",
    "making sure",
    "draft it",
];

/// Strip leading planning text from a generated story.
///
/// Some models prepend their outline or self-talk before the actual prose.
/// This scans from the top for the first line that does not read as
/// planning and returns everything from there. If the result is too short
/// to be a story the input is returned untouched.
pub fn clean_story(story: &str) -> String {
    let lines: Vec<&str> = story.lines().collect();

    let mut story_start = 0;
    for (i, line) in lines.iter().enumerate() {
        let line_lower = line.to_lowercase();
        let trimmed = line_lower.trim();
        if !trimmed.is_empty() && !PLANNING_MARKERS.iter().any(|m| trimmed.contains(m)) {
            story_start = i;
            break;
        }
    }

    let cleaned = lines[story_start..].join("\n").trim().to_string();

    // Over-aggressive cleaning would eat the whole story.
    if cleaned.len() < 100 {
        return story.trim().to_string();
    }

    cleaned
}
