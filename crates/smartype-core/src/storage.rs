use crate::config::{ensure_config_dir, get_preferences_file_path};
use crate::error::{Result, SmartypeError};
use crate::models::{rule_to_value, RawSubstitutionRule, TextPreferences};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Load the preference snapshot from the default location
pub fn load_preferences() -> Result<TextPreferences> {
    load_preferences_at(&get_preferences_file_path())
}

/// Load preferences, treating a missing file as an empty snapshot
pub fn load_preferences_or_default() -> Result<TextPreferences> {
    match load_preferences() {
        Ok(prefs) => Ok(prefs),
        Err(SmartypeError::PreferencesNotFound(_)) => Ok(TextPreferences::default()),
        Err(e) => Err(e),
    }
}

pub fn load_preferences_at(path: &Path) -> Result<TextPreferences> {
    if !path.exists() {
        return Err(SmartypeError::PreferencesNotFound(
            path.to_string_lossy().to_string(),
        ));
    }

    let content = fs::read_to_string(path)?;

    // Handle empty preferences file
    if content.trim().is_empty() {
        return Ok(TextPreferences::default());
    }

    serde_json::from_str(&content).map_err(|e| e.into())
}

/// Save preferences to the default location
pub fn save_preferences(prefs: &mut TextPreferences) -> Result<()> {
    ensure_config_dir()?;
    save_preferences_at(&get_preferences_file_path(), prefs)
}

pub fn save_preferences_at(path: &Path, prefs: &mut TextPreferences) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    prefs.touch();
    let serialized = serde_json::to_string_pretty(prefs)?;
    fs::write(path, serialized)?;

    Ok(())
}

fn load_for_update(path: &Path) -> Result<TextPreferences> {
    match load_preferences_at(path) {
        Ok(prefs) => Ok(prefs),
        Err(SmartypeError::PreferencesNotFound(_)) => Ok(TextPreferences::default()),
        Err(e) => Err(e),
    }
}

/// Apply `edit` to the raw entries of the file at `path`. Entries the edit
/// does not touch are written back exactly as they were read, malformed ones
/// included.
fn edit_entries_at<F>(path: &Path, edit: F) -> Result<()>
where
    F: FnOnce(&mut Vec<Value>) -> Result<()>,
{
    let mut prefs = load_for_update(path)?;
    edit(&mut prefs.substitutions)?;
    save_preferences_at(path, &mut prefs)
}

fn trigger_of(entry: &Map<String, Value>) -> Option<&str> {
    entry
        .get("replace")
        .or_else(|| entry.get("matchText"))
        .and_then(Value::as_str)
}

fn has_trigger(entry: &Value, match_text: &str) -> bool {
    entry
        .as_object()
        .and_then(trigger_of)
        .map_or(false, |trigger| trigger == match_text)
}

fn entry_mut<'a>(entries: &'a mut [Value], match_text: &str) -> Result<&'a mut Map<String, Value>> {
    entries
        .iter_mut()
        .filter_map(Value::as_object_mut)
        .find(|entry| trigger_of(entry) == Some(match_text))
        .ok_or_else(|| not_found(match_text))
}

/// Set a field under whichever spelling the entry already uses.
fn set_field(entry: &mut Map<String, Value>, key: &str, alias: &str, value: Value) {
    if entry.contains_key(alias) && !entry.contains_key(key) {
        entry.insert(alias.to_string(), value);
    } else {
        entry.insert(key.to_string(), value);
    }
}

fn not_found(match_text: &str) -> SmartypeError {
    SmartypeError::Other(format!("Substitution '{}' not found", match_text))
}

/// Add a new substitution
pub fn add_substitution(match_text: String, replacement_text: String) -> Result<()> {
    add_substitution_at(&get_preferences_file_path(), match_text, replacement_text)
}

pub fn add_substitution_at(path: &Path, match_text: String, replacement_text: String) -> Result<()> {
    if match_text.is_empty() {
        return Err(SmartypeError::Other(
            "Substitution trigger cannot be empty".to_string(),
        ));
    }

    edit_entries_at(path, |entries| {
        if entries.iter().any(|entry| has_trigger(entry, &match_text)) {
            return Err(SmartypeError::Other(format!(
                "Substitution '{}' already exists",
                match_text
            )));
        }
        entries.push(rule_to_value(&RawSubstitutionRule::new(match_text, replacement_text)));
        Ok(())
    })
}

/// Delete a substitution by its trigger
pub fn delete_substitution(match_text: &str) -> Result<()> {
    delete_substitution_at(&get_preferences_file_path(), match_text)
}

pub fn delete_substitution_at(path: &Path, match_text: &str) -> Result<()> {
    edit_entries_at(path, |entries| {
        let before = entries.len();
        entries.retain(|entry| !has_trigger(entry, match_text));
        if entries.len() == before {
            return Err(not_found(match_text));
        }
        Ok(())
    })
}

/// Update the replacement of an existing substitution
pub fn update_substitution(match_text: &str, replacement_text: String) -> Result<()> {
    update_substitution_at(&get_preferences_file_path(), match_text, replacement_text)
}

pub fn update_substitution_at(path: &Path, match_text: &str, replacement_text: String) -> Result<()> {
    edit_entries_at(path, |entries| {
        let entry = entry_mut(entries, match_text)?;
        set_field(entry, "with", "replacementText", Value::String(replacement_text));
        Ok(())
    })
}

/// Turn a substitution on or off without deleting it
pub fn set_substitution_enabled(match_text: &str, enabled: bool) -> Result<()> {
    set_substitution_enabled_at(&get_preferences_file_path(), match_text, enabled)
}

pub fn set_substitution_enabled_at(path: &Path, match_text: &str, enabled: bool) -> Result<()> {
    edit_entries_at(path, |entries| {
        let entry = entry_mut(entries, match_text)?;
        set_field(entry, "on", "enabled", Value::Bool(enabled));
        Ok(())
    })
}

pub fn set_smart_quotes(enabled: bool) -> Result<()> {
    set_smart_quotes_at(&get_preferences_file_path(), enabled)
}

pub fn set_smart_quotes_at(path: &Path, enabled: bool) -> Result<()> {
    let mut prefs = load_for_update(path)?;
    prefs.use_smart_quotes = enabled;
    save_preferences_at(path, &mut prefs)
}

pub fn set_smart_dashes(enabled: bool) -> Result<()> {
    set_smart_dashes_at(&get_preferences_file_path(), enabled)
}

pub fn set_smart_dashes_at(path: &Path, enabled: bool) -> Result<()> {
    let mut prefs = load_for_update(path)?;
    prefs.use_smart_dashes = enabled;
    save_preferences_at(path, &mut prefs)
}

/// Find a substitution by its trigger
pub fn find_rule<'a>(
    rules: &'a [RawSubstitutionRule],
    match_text: &str,
) -> Option<&'a RawSubstitutionRule> {
    rules.iter().find(|rule| rule.match_text == match_text)
}
