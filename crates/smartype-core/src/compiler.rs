use crate::boundary::{starts_with_boundary, BOUNDARY_CLASS};
use crate::error::Result;
use crate::models::{RawSubstitutionRule, TextPreferences};
use crate::punctuation::{scrub, smart_punctuation_rules};
use crate::rule::{BoundaryPattern, CompiledRule};
use std::cmp::Reverse;
use std::time::Instant;

/// Flags every compiled pattern is built with.
pub const PATTERN_FLAGS: &str = "u";

/// Regex source for a user trigger.
///
/// The left capture is the start of input or one boundary character, unless
/// the trigger already starts with a boundary (`(tm)`), in which case it is
/// empty so that `BigCompany(tm)` matches. The right capture is always one
/// boundary character: a word only counts once it has been ended.
pub fn trigger_pattern_source(match_text: &str) -> String {
    let left = if starts_with_boundary(match_text) {
        String::new()
    } else {
        format!("^|{}", BOUNDARY_CLASS)
    };

    format!("({}){}({})", left, regex::escape(match_text), BOUNDARY_CLASS)
}

/// Compile one user rule with an already scrubbed replacement.
pub fn compile_rule(match_text: &str, replacement: &str) -> Result<CompiledRule> {
    let matcher = BoundaryPattern::new(trigger_pattern_source(match_text), PATTERN_FLAGS)?;
    Ok(CompiledRule::new(
        matcher,
        replacement,
        Some(match_text.to_string()),
    ))
}

/// Compile user rules plus the enabled smart punctuation into one ordered
/// list: enabled user rules, longest trigger first, then smart quotes, then
/// smart dashes.
///
/// A rule that cannot be compiled is logged and skipped.
pub fn compile(
    rules: &[RawSubstitutionRule],
    smart_quotes: bool,
    smart_dashes: bool,
) -> Vec<CompiledRule> {
    log::debug!("Smart quotes are {}", if smart_quotes { "on" } else { "off" });
    log::debug!("Smart dashes are {}", if smart_dashes { "on" } else { "off" });

    let started = Instant::now();
    let smart = smart_punctuation_rules(smart_quotes, smart_dashes);

    let mut enabled: Vec<&RawSubstitutionRule> = rules.iter().filter(|rule| rule.enabled).collect();
    // stable, so equal lengths keep their original order
    enabled.sort_by_key(|rule| Reverse(rule.match_text.chars().count()));

    let mut compiled = Vec::with_capacity(enabled.len() + smart.len());
    for rule in enabled {
        if rule.match_text.is_empty() {
            log::warn!("Skipping substitution with an empty trigger");
            continue;
        }

        let replacement = scrub(&rule.replacement_text, &smart);
        match compile_rule(&rule.match_text, &replacement) {
            Ok(compiled_rule) => compiled.push(compiled_rule),
            Err(err) => log::warn!("Skipping substitution {:?}: {}", rule.match_text, err),
        }
    }

    let user_rules = compiled.len();
    compiled.extend(smart);

    log::info!(
        "Compiled {} of {} substitutions ({} total rules) in {:?}",
        user_rules,
        rules.len(),
        compiled.len(),
        started.elapsed()
    );

    compiled
}

/// Compile a whole preference snapshot, skipping malformed entries.
pub fn compile_preferences(prefs: &TextPreferences) -> Vec<CompiledRule> {
    compile(&prefs.rules(), prefs.use_smart_quotes, prefs.use_smart_dashes)
}
