use anyhow::Result;
use regex::Regex;

/// Characters stripped from OCR output by default.
pub const DEFAULT_REMOVE_CHARS: [char; 2] = ['|', ':'];

/// Unicode whitespace plus the ASCII information separators `\x1c`-`\x1f`.
pub fn is_blank(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}

/// Trims [`is_blank`] characters from both ends.
pub fn trim_blank(s: &str) -> &str {
    s.trim_matches(is_blank)
}

/// Strips noise characters and collapses spaces while keeping line structure.
///
/// Runs of spaces inside a line collapse to a single space, so multi-space
/// indentation is lost.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    noise: Option<Regex>,
    spaces: Regex,
}

impl TextNormalizer {
    /// Builds a normalizer removing every character in `remove_chars`.
    ///
    /// Line feeds are never removed, whatever the set contains.
    pub fn new(remove_chars: &[char]) -> Result<Self> {
        let class: String = remove_chars
            .iter()
            .filter(|&&c| c != '\n')
            .map(|c| regex::escape(&c.to_string()))
            .collect();

        let noise = if class.is_empty() {
            None
        } else {
            Some(Regex::new(&format!("[{}]", class))?)
        };

        Ok(Self {
            noise,
            spaces: Regex::new(" +")?,
        })
    }

    /// Normalizes one OCR transcription.
    ///
    /// The output has exactly as many `\n`-separated lines as the input.
    pub fn clean(&self, text: &str) -> String {
        let stripped = match &self.noise {
            Some(noise) => noise.replace_all(text, ""),
            None => text.into(),
        };

        stripped
            .split('\n')
            .map(|line| trim_blank(&self.spaces.replace_all(line, " ")).to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
