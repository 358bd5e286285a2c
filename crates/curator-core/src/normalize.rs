//! Free-text canonicalization for titles and channel names.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

#[allow(clippy::unwrap_used)] // Patterns are compile-time constants
static DOUBLE_PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\(.*?\)\)").unwrap());
#[allow(clippy::unwrap_used)]
static PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").unwrap());
#[allow(clippy::unwrap_used)]
static BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").unwrap());
#[allow(clippy::unwrap_used)]
static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
#[allow(clippy::unwrap_used)]
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Canonicalize free text so cosmetic variations compare equal.
///
/// Lowercases, strips accents and non-ASCII characters, drops annotations
/// in parentheses and brackets, turns `Artist: Song` into `artist - song`,
/// replaces remaining punctuation with spaces and collapses whitespace.
pub fn normalize(text: &str) -> String {
    let text = text.to_lowercase();

    // NFD splits accented letters into base + combining mark; the marks are non-ASCII.
    let text: String = text.nfd().filter(char::is_ascii).collect();

    let text = text.replace(['\'', '.'], "").replace(" & ", " and ");

    let text = DOUBLE_PARENS.replace_all(&text, "");
    let text = PARENS.replace_all(&text, "");
    let text = BRACKETS.replace_all(&text, "");

    // "Artist: song" -> "Artist - song"
    let text = text.replace(':', " - ");
    let text = PUNCTUATION.replace_all(&text, " ");

    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Uppercase the first letter of every word and lowercase the rest.
///
/// A word starts at any letter not preceded by another letter, so
/// `jay-z` becomes `Jay-Z` and `2pac` becomes `2Pac`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_accents() {
        assert_eq!(normalize("Café"), "cafe");
        assert_eq!(normalize("CAFE"), normalize("Café"));
        assert_eq!(normalize("Mötley Crüe"), "motley crue");
    }

    #[test]
    fn test_non_ascii_dropped() {
        assert_eq!(normalize("Song 東京"), "song");
    }

    #[test]
    fn test_bracket_removal() {
        assert_eq!(normalize("Song (Live) [HD]"), normalize("Song"));
        assert_eq!(normalize("Song ((Official)) (Remix)"), "song");
        assert_eq!(normalize("A (x) B (y) C"), "a b c");
    }

    #[test]
    fn test_apostrophes_periods_and_ampersand() {
        assert_eq!(normalize("Don't Stop"), "dont stop");
        assert_eq!(normalize("Mr. Brightside"), "mr brightside");
        assert_eq!(normalize("Simon & Garfunkel"), "simon and garfunkel");
    }

    #[test]
    fn test_colon_becomes_separator() {
        assert_eq!(normalize("Artist: Song"), "artist - song");
    }

    #[test]
    fn test_punctuation_and_whitespace() {
        assert_eq!(normalize("  Hello,   World!  "), "hello world");
        assert_eq!(normalize("Artist - Song_Name"), "artist - song_name");
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "Café: Déjà Vu (Live) [HD]",
            "AC/DC - Back In Black ((Official Video))",
            "  Guns N' Roses & Friends!!  ",
            "",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("artist - song"), "Artist - Song");
        assert_eq!(title_case("jay-z - 99 problems"), "Jay-Z - 99 Problems");
        assert_eq!(title_case("2pac"), "2Pac");
        assert_eq!(title_case("ALL CAPS"), "All Caps");
    }
}
