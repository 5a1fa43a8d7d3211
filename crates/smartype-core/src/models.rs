use crate::error::{Result, SmartypeError};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// One entry of the user's text replacement dictionary.
///
/// Stored with the system dictionary keys `replace` / `with` / `on`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawSubstitutionRule {
    #[serde(rename = "replace", alias = "matchText")]
    pub match_text: String,
    #[serde(rename = "with", alias = "replacementText")]
    pub replacement_text: String,
    #[serde(rename = "on", alias = "enabled", default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl RawSubstitutionRule {
    pub fn new(match_text: impl Into<String>, replacement_text: impl Into<String>) -> Self {
        Self {
            match_text: match_text.into(),
            replacement_text: replacement_text.into(),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Parse a single dictionary entry, rejecting anything that is not a
    /// string trigger with a string replacement.
    pub fn from_value(index: usize, value: &Value) -> Result<Self> {
        let invalid = |reason: &str| SmartypeError::InvalidRule {
            index,
            reason: reason.to_string(),
        };

        let entry = value.as_object().ok_or_else(|| invalid("entry is not an object"))?;
        let field = |primary: &str, alias: &str| entry.get(primary).or_else(|| entry.get(alias));

        let match_text = field("replace", "matchText")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("`replace` is missing or not a string"))?;
        let replacement_text = field("with", "replacementText")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("`with` is missing or not a string"))?;
        let enabled = match field("on", "enabled") {
            None | Some(Value::Null) => true,
            Some(Value::Bool(on)) => *on,
            Some(_) => return Err(invalid("`on` is not a boolean")),
        };

        if match_text.is_empty() {
            return Err(invalid("`replace` is empty"));
        }

        Ok(Self {
            match_text: match_text.to_string(),
            replacement_text: replacement_text.to_string(),
            enabled,
        })
    }
}

/// A snapshot of the user's text preferences.
///
/// `substitutions` keeps the raw JSON entries so that one malformed entry can
/// be skipped at compile time without losing the rest of the file.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextPreferences {
    #[serde(default)]
    pub substitutions: Vec<Value>,
    #[serde(default)]
    pub use_smart_quotes: bool,
    #[serde(default)]
    pub use_smart_dashes: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

impl TextPreferences {
    pub fn new(rules: &[RawSubstitutionRule], use_smart_quotes: bool, use_smart_dashes: bool) -> Self {
        Self {
            substitutions: rules.iter().map(rule_to_value).collect(),
            use_smart_quotes,
            use_smart_dashes,
            modified: None,
        }
    }

    /// Well-formed entries, in file order.
    pub fn rules(&self) -> Vec<RawSubstitutionRule> {
        self.substitutions
            .iter()
            .enumerate()
            .filter_map(|(index, value)| match RawSubstitutionRule::from_value(index, value) {
                Ok(rule) => Some(rule),
                Err(err) => {
                    log::warn!("Skipping substitution: {}", err);
                    None
                }
            })
            .collect()
    }


    /// Identity of the parts of the snapshot that affect compilation.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for value in &self.substitutions {
            value.to_string().hash(&mut hasher);
        }
        self.use_smart_quotes.hash(&mut hasher);
        self.use_smart_dashes.hash(&mut hasher);
        hasher.finish()
    }

    pub fn touch(&mut self) {
        self.modified = Some(Local::now().to_rfc3339());
    }

    pub fn formatted_time(&self) -> Option<String> {
        let modified = DateTime::parse_from_rfc3339(self.modified.as_deref()?)
            .map(|dt| dt.with_timezone(&Local))
            .ok()?;

        let duration = Local::now().signed_duration_since(modified);

        Some(if duration.num_seconds() < 60 {
            format!("{}s ago", duration.num_seconds())
        } else if duration.num_minutes() < 60 {
            format!("{}m ago", duration.num_minutes())
        } else if duration.num_hours() < 24 {
            format!("{}h ago", duration.num_hours())
        } else {
            format!("{}d ago", duration.num_days())
        })
    }
}

pub(crate) fn rule_to_value(rule: &RawSubstitutionRule) -> Value {
    serde_json::json!({
        "replace": rule.match_text,
        "with": rule.replacement_text,
        "on": rule.enabled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enabled_defaults_to_true() {
        let rule: RawSubstitutionRule =
            serde_json::from_value(json!({ "replace": "omw", "with": "On my way!" })).unwrap();
        assert!(rule.enabled);

        let rule = RawSubstitutionRule::from_value(0, &json!({ "replace": "omw", "with": "x" })).unwrap();
        assert!(rule.enabled);
    }

    #[test]
    fn camel_case_aliases_are_accepted() {
        let rule = RawSubstitutionRule::from_value(
            0,
            &json!({ "matchText": "shrug", "replacementText": "¯\\_(ツ)_/¯", "enabled": false }),
        )
        .unwrap();
        assert_eq!(rule.match_text, "shrug");
        assert!(!rule.enabled);
    }

    #[test]
    fn malformed_entries_are_rejected_individually() {
        let prefs = TextPreferences {
            substitutions: vec![
                json!({ "replace": 42, "with": "x" }),
                json!({ "replace": "ok", "with": "fine" }),
                json!("not an object"),
                json!({ "replace": "", "with": "empty" }),
                json!({ "replace": "bad", "with": "flag", "on": "yes" }),
            ],
            ..Default::default()
        };

        let rules = prefs.rules();
        assert_eq!(rules, vec![RawSubstitutionRule::new("ok", "fine")]);
    }

    #[test]
    fn fingerprint_ignores_modified_time() {
        let mut prefs = TextPreferences::new(&[RawSubstitutionRule::new("a", "b")], true, false);
        let before = prefs.fingerprint();
        prefs.touch();
        assert_eq!(before, prefs.fingerprint());

        prefs.use_smart_dashes = true;
        assert_ne!(before, prefs.fingerprint());
    }

    #[test]
    fn preferences_file_format() {
        let prefs: TextPreferences = serde_json::from_str(
            r#"{ "substitutions": [{ "replace": "(c)", "with": "©" }], "useSmartQuotes": true }"#,
        )
        .unwrap();
        assert!(prefs.use_smart_quotes);
        assert!(!prefs.use_smart_dashes);
        assert_eq!(prefs.rules()[0].replacement_text, "©");
    }
}
