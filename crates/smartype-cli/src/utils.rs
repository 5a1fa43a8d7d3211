use smartype_core::compiler::compile_preferences;
use smartype_core::models::TextPreferences;
use smartype_core::serialization::deserialize;
use smartype_core::{load_preferences_or_default, CompiledRule, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Rules from a payload file, or compiled from the stored preferences.
pub fn load_rules(payload: Option<&Path>) -> Result<Arc<[CompiledRule]>> {
    let rules = match payload {
        Some(path) => deserialize(&fs::read(path)?)?,
        None => compile_preferences(&load_preferences_or_default()?),
    };
    Ok(rules.into())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

pub fn print_preferences(prefs: &TextPreferences) {
    let rules = prefs.rules();

    if rules.is_empty() {
        println!("No substitutions yet. Add one with 'smartype add -s <trigger> -c <replacement>'.");
    } else {
        let width = rules
            .iter()
            .map(|rule| rule.match_text.chars().count())
            .max()
            .unwrap_or(0);

        for rule in &rules {
            let marker = if rule.enabled { " " } else { "-" };
            println!(
                "{} {:<width$}  {}",
                marker,
                rule.match_text,
                rule.replacement_text,
                width = width
            );
        }
    }

    println!();
    println!("Smart quotes: {}", on_off(prefs.use_smart_quotes));
    println!("Smart dashes: {}", on_off(prefs.use_smart_dashes));
    if let Some(modified) = prefs.formatted_time() {
        println!("Last modified: {}", modified);
    }
}
