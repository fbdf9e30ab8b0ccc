use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").unwrap());
static PARENTHESISED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").unwrap());

/// Minimum share of Cyrillic characters for text to count as Bulgarian.
pub const MIN_CYRILLIC_RATIO: f32 = 0.3;

/// Strips markup and annotations from a field value so it can be spoken.
///
/// Whitespace is collapsed before the bracket passes run, so removing an
/// annotation in the middle of a phrase can leave a double space. The
/// result feeds the cache digest, so the order must stay stable.
pub fn clean_text_for_tts(text: &str) -> String {
    let text = HTML_TAG.replace_all(text, "");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let text = BRACKETED.replace_all(&text, "");
    let text = PARENTHESISED.replace_all(&text, "");
    text.trim().to_string()
}

pub fn is_cyrillic(c: char) -> bool {
    ('\u{0400}'..='\u{04FF}').contains(&c)
}

pub fn cyrillic_ratio(text: &str) -> f32 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let cyrillic = text.chars().filter(|c| is_cyrillic(*c)).count();
    cyrillic as f32 / total as f32
}

#[derive(Debug, Clone, PartialEq)]
pub enum Unsuitable {
    Empty,
    NoLetters,
    NotBulgarian { ratio: f32 },
}

impl fmt::Display for Unsuitable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unsuitable::Empty => write!(f, "Empty text"),
            Unsuitable::NoLetters => write!(f, "Text contains only punctuation/symbols"),
            Unsuitable::NotBulgarian { ratio } => {
                write!(f, "Text doesn't appear to be Bulgarian ({:.0}% Cyrillic)", ratio * 100.0)
            }
        }
    }
}

/// Decides whether cleaned text is worth sending to the speech service.
pub fn check_tts_suitability(text: &str) -> Result<(), Unsuitable> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Unsuitable::Empty);
    }

    if !text.chars().any(char::is_alphabetic) {
        return Err(Unsuitable::NoLetters);
    }

    let ratio = cyrillic_ratio(text);
    if ratio < MIN_CYRILLIC_RATIO {
        return Err(Unsuitable::NotBulgarian { ratio });
    }

    Ok(())
}

/// First 8 hex characters of the MD5 of the text.
pub fn text_digest(text: &str) -> String {
    let digest = format!("{:x}", md5::compute(text.as_bytes()));
    digest[..8].to_string()
}

/// Truncates to at most `max` characters for log lines.
pub fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
