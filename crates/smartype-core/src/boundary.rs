//! What counts as the edge of a word.
//!
//! `\b` is not used anywhere: it only knows about ASCII-ish word characters
//! and would not treat curly quotes or dashes as separators.

/// Characters that separate words: whitespace, common punctuation, straight
/// and curly quotes, and the hyphen/dash family.
pub const BOUNDARY_CHARS: &[char] = &[
    ' ', '\n', '\r', '\t', '.', ',', '|', '{', '}', '(', ')', '<', '>', '\'', '"', '`', '+', '!',
    '?', '«', '»', '“', '”', '‘', '’', '‹', '›', '—', '–', '−', '-',
];

/// `BOUNDARY_CHARS` as a regex character class.
pub const BOUNDARY_CLASS: &str = r#"[ \n\r\t\.,\|\{\}\(\)<>'"`\+!\?«»“”‘’‹›—–−\-]"#;

/// Returns true if `ch` separates words.
pub fn is_boundary(ch: char) -> bool {
    BOUNDARY_CHARS.contains(&ch)
}

/// Returns true if `text` begins with a boundary character, e.g. `(tm)`.
pub fn starts_with_boundary(text: &str) -> bool {
    text.chars().next().is_some_and(is_boundary)
}

/// Byte index where the word block ending at `caret` begins.
///
/// Whitespace sitting directly before the caret is ignored, so after typing
/// `"foo bar "` the block is `"bar "` rather than the empty string. Returns 0
/// when there is no earlier whitespace. `caret` is clamped to the value and
/// moved back to the nearest char boundary.
pub fn word_start(value: &str, caret: usize) -> usize {
    let caret = floor_char_boundary(value, caret);
    let to_caret = value[..caret].trim_end();

    to_caret
        .char_indices()
        .filter(|(_, ch)| ch.is_whitespace())
        .last()
        .map(|(idx, ch)| idx + ch.len_utf8())
        .unwrap_or(0)
}

pub(crate) fn floor_char_boundary(value: &str, index: usize) -> usize {
    let mut index = index.min(value.len());
    while !value.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn class_and_char_list_agree() {
        let class = Regex::new(&format!("^{}$", BOUNDARY_CLASS)).unwrap();
        for ch in BOUNDARY_CHARS {
            assert!(class.is_match(&ch.to_string()), "class misses {:?}", ch);
        }
        for ch in ['a', 'Z', '0', '_', 'é', '™', '/', ':', ';'] {
            assert!(!is_boundary(ch));
            assert!(!class.is_match(&ch.to_string()), "class has {:?}", ch);
        }
    }

    #[test]
    fn word_start_skips_trailing_whitespace() {
        assert_eq!(word_start("foo bar ", 8), 4);
        assert_eq!(word_start("foo bar", 7), 4);
        assert_eq!(word_start("foo  \t", 6), 0);
        assert_eq!(word_start("", 0), 0);
    }

    #[test]
    fn word_start_only_looks_before_caret() {
        let value = "one two three";
        assert_eq!(word_start(value, 7), 4);
        assert_eq!(word_start(value, 3), 0);
    }

    #[test]
    fn word_start_handles_multibyte_text() {
        let value = "deserves… ಠ_ಠ ";
        let start = word_start(value, value.len());
        assert_eq!(&value[start..], "ಠ_ಠ ");
        // caret in the middle of a multibyte char is pulled back
        assert_eq!(word_start(value, value.len() - 2), word_start(value, value.len() - 4));
    }

    #[test]
    fn boundary_prefix() {
        assert!(starts_with_boundary("(tm)"));
        assert!(starts_with_boundary("...."));
        assert!(!starts_with_boundary("shrug"));
        assert!(!starts_with_boundary(""));
    }
}
