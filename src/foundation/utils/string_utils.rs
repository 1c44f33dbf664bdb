use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Characters that cannot appear in a file name on at least one common platform.
const FILENAME_HOSTILE: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

fn bracketed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[.*?\]|\(.*?\)").expect("static regex"))
}

/// Cleans up a song title by removing text within square brackets or parentheses.
///
/// Chart titles and catalog titles disagree mostly on decorations such as
/// "(Remastered)", "[Live]" or "(feat. Somebody)". Stripping them before
/// comparing gives a fairer match.
///
/// # Examples
///
/// ```
/// use chartposter::foundation::utils::clean_title;
///
/// assert_eq!(clean_title("Blinding Lights (Remastered)"), "Blinding Lights");
/// assert_eq!(clean_title("Levitating [Live]"), "Levitating");
/// ```
pub fn clean_title(name: &str) -> String {
    let cleaned = bracketed().replace_all(name, "");
    cleaned.trim().to_string()
}

/// Normalizes Unicode characters and converts text to lowercase.
///
/// The text is decomposed (NFD), combining marks are dropped and the result
/// is lowercased, so "Beyoncé" and "Beyonce" compare equal.
///
/// # Examples
///
/// ```
/// use chartposter::foundation::utils::normalize_unicode;
///
/// assert_eq!(normalize_unicode("Café"), "cafe");
/// ```
pub fn normalize_unicode(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Builds the key used to decide whether a catalog title is the chart title.
///
/// Decorations are removed, accents folded and every run of non-alphanumeric
/// characters collapsed into a single space.
pub fn match_key(input: &str) -> String {
    normalize_unicode(&clean_title(input))
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Makes a string safe to use as one component of a file name.
///
/// Hostile characters become `-`, surrounding whitespace and dots are trimmed
/// and the result is cut to at most `max_graphemes` user-perceived characters.
/// An empty result falls back to `"untitled"`.
pub fn sanitize_file_component(input: &str, max_graphemes: usize) -> String {
    let replaced: String = input
        .chars()
        .map(|c| {
            if FILENAME_HOSTILE.contains(&c) || c.is_control() {
                '-'
            } else {
                c
            }
        })
        .collect();

    let truncated: String = replaced
        .trim()
        .graphemes(true)
        .take(max_graphemes)
        .collect();

    let trimmed = truncated.trim().trim_matches('.');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_title_strips_decorations() {
        assert_eq!(clean_title("Dark Side [Remastered]"), "Dark Side");
        assert_eq!(clean_title("Stay (feat. Justin Bieber)"), "Stay");
        assert_eq!(clean_title("Plain Title"), "Plain Title");
    }

    #[test]
    fn test_normalize_unicode_folds_accents() {
        assert_eq!(normalize_unicode("Beyoncé"), "beyonce");
        assert_eq!(normalize_unicode("Björk"), "bjork");
    }

    #[test]
    fn test_match_key_ignores_punctuation_and_case() {
        assert_eq!(match_key("Don't Start Now"), match_key("DON'T START NOW"));
        assert_eq!(match_key("Say So (Remix)"), "say so");
        assert_eq!(match_key("  WAP!!  "), "wap");
    }

    #[test]
    fn test_sanitize_file_component() {
        assert_eq!(sanitize_file_component("AC/DC", 80), "AC-DC");
        assert_eq!(sanitize_file_component("What?: <Yes>", 80), "What-- -Yes-");
        assert_eq!(sanitize_file_component("   ", 80), "untitled");
        assert_eq!(sanitize_file_component("abcdef", 3), "abc");
    }

    #[test]
    fn test_sanitize_keeps_graphemes_intact() {
        let flag_heavy = "e\u{301}e\u{301}e\u{301}";
        let cut = sanitize_file_component(flag_heavy, 2);
        assert_eq!(cut.graphemes(true).count(), 2);
        assert_eq!(cut, "e\u{301}e\u{301}");
    }
}
