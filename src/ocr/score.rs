use super::clean::trim_blank;

/// Keywords worth +5 each when present anywhere in the lower-cased text.
///
/// Presence is a substring check counted once per keyword, so "if" also
/// matches inside "gift".
pub const KEYWORDS: [&str; 18] = [
    "function", "const", "let", "var", "if", "else", "for", "while", "return", "class", "import",
    "export", "async", "await", "new", "this", "document", "window",
];

/// Symbols worth +0.5 per occurrence.
pub const CODE_SYMBOLS: [char; 10] = ['{', '}', '(', ')', ';', '=', '[', ']', '/', '*'];

const KEYWORD_POINTS: f64 = 5.0;
const SYMBOL_POINTS: f64 = 0.5;
const LINE_POINTS: f64 = 2.0;

/// Texts shorter than this (after trimming) score zero.
const MIN_TRIMMED_LEN: usize = 10;

/// Scores how much a cleaned transcription looks like source code.
///
/// Keywords are existence checks while symbols are occurrence counts.
pub fn score_code(text: &str) -> f64 {
    if trim_blank(text).chars().count() < MIN_TRIMMED_LEN {
        return 0.0;
    }

    let lower = text.to_lowercase();
    let keywords = KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count();

    let symbols = text.chars().filter(|c| CODE_SYMBOLS.contains(c)).count();

    let lines = text.split('\n').filter(|line| !trim_blank(line).is_empty()).count();

    keywords as f64 * KEYWORD_POINTS + symbols as f64 * SYMBOL_POINTS + lines as f64 * LINE_POINTS
}
