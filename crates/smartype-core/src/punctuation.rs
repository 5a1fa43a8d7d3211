//! Built-in smart quote and smart dash rules.
//!
//! Each group is applied in order, so earlier entries see the raw text and
//! later ones see what the earlier ones produced.

use crate::rule::{BoundaryPattern, CompiledRule};
use once_cell::sync::Lazy;

pub const OPENING_SINGLE_QUOTE: &str = "\u{2018}"; // ‘
pub const CLOSING_SINGLE_QUOTE: &str = "\u{2019}"; // ’
pub const OPENING_DOUBLE_QUOTE: &str = "\u{201c}"; // “
pub const CLOSING_DOUBLE_QUOTE: &str = "\u{201d}"; // ”
pub const EM_DASH: &str = "\u{2014}"; // —
pub const ELLIPSIS: &str = "\u{2026}"; // …

/// (pattern, replacement) pairs for straight → curly quotes.
pub const SMART_QUOTES: &[(&str, &str)] = &[
    // closing double quote after a non-space
    (r#"(\S)"([\S\s])"#, CLOSING_DOUBLE_QUOTE),
    // any other double quote opens
    (r#"()"([\S\s])"#, OPENING_DOUBLE_QUOTE),
    // single quote followed by a non-word char closes
    (r"([\S\s])'(\W)", CLOSING_SINGLE_QUOTE),
    // single quote at the start of a word opens
    (r"(\W|^)'([\w\s])", OPENING_SINGLE_QUOTE),
    // apostrophe inside a word
    (r"(\w)'(\w+\W)", CLOSING_SINGLE_QUOTE),
];

/// (pattern, replacement) pairs for hyphens → em dash and dots → ellipsis.
pub const SMART_DASHES: &[(&str, &str)] = &[
    (r"(^|[^-])---([^-])", EM_DASH),
    (r"(^|[^-])--([^-])", EM_DASH),
    (r"(^|[^.])\.\.\.([^.])", ELLIPSIS),
];

static QUOTE_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| build(SMART_QUOTES));
static DASH_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| build(SMART_DASHES));

fn build(table: &[(&str, &str)]) -> Vec<CompiledRule> {
    table
        .iter()
        .map(|(source, replacement)| {
            let matcher =
                BoundaryPattern::new(*source, "u").expect("Valid smart punctuation pattern");
            CompiledRule::new(matcher, *replacement, None)
        })
        .collect()
}

pub fn smart_quote_rules() -> &'static [CompiledRule] {
    &QUOTE_RULES
}

pub fn smart_dash_rules() -> &'static [CompiledRule] {
    &DASH_RULES
}

/// The enabled groups, quotes before dashes.
pub fn smart_punctuation_rules(smart_quotes: bool, smart_dashes: bool) -> Vec<CompiledRule> {
    let mut rules = Vec::new();
    if smart_quotes {
        rules.extend_from_slice(smart_quote_rules());
    }
    if smart_dashes {
        rules.extend_from_slice(smart_dash_rules());
    }
    rules
}

/// Run `text` through each rule once, in order, replacing only the first
/// match of each.
pub fn scrub(text: &str, rules: &[CompiledRule]) -> String {
    rules
        .iter()
        .fold(text.to_string(), |output, rule| rule.replace_first(&output).into_owned())
}
