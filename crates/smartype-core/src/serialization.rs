//! Compiled rules as plain data, for handing them to another thread or
//! process. Patterns travel as source + flags and are rebuilt on arrival.

use crate::error::{Result, SmartypeError};
use crate::rule::{BoundaryPattern, CompiledRule};
use serde::{Deserialize, Serialize};

pub const PAYLOAD_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RuleRecord {
    pub source: String,
    #[serde(default)]
    pub flags: String,
    pub replacement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RulePayload {
    pub version: u32,
    pub rules: Vec<RuleRecord>,
}

impl From<&CompiledRule> for RuleRecord {
    fn from(rule: &CompiledRule) -> Self {
        Self {
            source: rule.matcher.source().to_string(),
            flags: rule.matcher.flags().to_string(),
            replacement: rule.replacement.clone(),
            trigger: rule.trigger.clone(),
        }
    }
}

impl TryFrom<RuleRecord> for CompiledRule {
    type Error = SmartypeError;

    fn try_from(record: RuleRecord) -> Result<Self> {
        let matcher = BoundaryPattern::new(record.source, record.flags)?;
        Ok(CompiledRule::new(matcher, record.replacement, record.trigger))
    }
}

impl RulePayload {
    pub fn from_rules(rules: &[CompiledRule]) -> Self {
        Self {
            version: PAYLOAD_VERSION,
            rules: rules.iter().map(RuleRecord::from).collect(),
        }
    }

    pub fn into_rules(self) -> Result<Vec<CompiledRule>> {
        if self.version != PAYLOAD_VERSION {
            return Err(SmartypeError::UnsupportedPayload(format!(
                "version {} (expected {})",
                self.version, PAYLOAD_VERSION
            )));
        }

        self.rules.into_iter().map(CompiledRule::try_from).collect()
    }
}

pub fn serialize(rules: &[CompiledRule]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&RulePayload::from_rules(rules))?)
}

/// Rebuild rules from `serialize` output. Any pattern that does not compile
/// with exactly two boundary captures fails the whole payload.
pub fn deserialize(bytes: &[u8]) -> Result<Vec<CompiledRule>> {
    let payload: RulePayload = serde_json::from_slice(bytes)?;
    payload.into_rules()
}
