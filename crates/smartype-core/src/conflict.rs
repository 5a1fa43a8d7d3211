//! Duplicate-trigger suppression.
//!
//! Rule order (longest trigger first) is the main overlap policy. On top of
//! it a match is dropped when the whole matched span, boundaries included,
//! is itself the trigger of another rule: typing `<-|` must not let the `<-`
//! rule fire on `<-` + the `|` boundary, since `<-|` is a trigger of its own.

use crate::rule::{BoundaryMatch, CompiledRule};

/// Index of a rule other than `candidate` whose trigger equals the matched
/// span, if any.
pub fn conflicting_rule(
    rules: &[CompiledRule],
    candidate: usize,
    found: &BoundaryMatch<'_>,
) -> Option<usize> {
    rules
        .iter()
        .enumerate()
        .find(|(index, rule)| *index != candidate && rule.trigger.as_deref() == Some(found.matched))
        .map(|(index, _)| index)
}

/// True if the match of `rules[candidate]` may be applied.
pub fn survives(rules: &[CompiledRule], candidate: usize, found: &BoundaryMatch<'_>) -> bool {
    match conflicting_rule(rules, candidate, found) {
        Some(other) => {
            log::debug!(
                "The match {:?} is the trigger of rule {}, skipping rule {}",
                found.matched,
                other,
                candidate
            );
            false
        }
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::models::RawSubstitutionRule;

    fn arrows() -> Vec<CompiledRule> {
        compile(
            &[
                RawSubstitutionRule::new("->", "→"),
                RawSubstitutionRule::new("<-", "←"),
                RawSubstitutionRule::new("|->", "↳"),
                RawSubstitutionRule::new("<-|", "↵"),
            ],
            false,
            false,
        )
    }

    #[test]
    fn match_equal_to_another_trigger_is_rejected() {
        let rules = arrows();
        let short = rules
            .iter()
            .position(|rule| rule.trigger.as_deref() == Some("<-"))
            .unwrap();
        let found = rules[short].matcher.find("<-|").unwrap();
        assert_eq!(found.matched, "<-|");

        let other = conflicting_rule(&rules, short, &found).unwrap();
        assert_eq!(rules[other].trigger.as_deref(), Some("<-|"));
        assert!(!survives(&rules, short, &found));
    }

    #[test]
    fn ordinary_match_survives() {
        let rules = arrows();
        let short = rules
            .iter()
            .position(|rule| rule.trigger.as_deref() == Some("<-"))
            .unwrap();
        let found = rules[short].matcher.find("<- ").unwrap();
        assert!(survives(&rules, short, &found));
    }

    #[test]
    fn smart_rules_never_conflict() {
        let rules = compile(&[], true, true);
        let found = rules[0].matcher.find("a\" ").unwrap();
        assert!(survives(&rules, 0, &found));
    }
}
