use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One fragment of a compiled policy text describing a single policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyBlock {
    pub raw_text: String,
}

impl PolicyBlock {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw_text
    }
}

/// Lifecycle state read from a policy block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PolicyStatus {
    Active,
    Cancelled,
    Expiring { days: u32 },
    #[default]
    Unknown,
}

impl PolicyStatus {
    /// Label in the vocabulary of the label field itself.
    pub fn label(self) -> String {
        match self {
            Self::Active => "VIGENTE".to_string(),
            Self::Cancelled => "ANULADA".to_string(),
            Self::Expiring { days } => format!("VENCE {days}D"),
            Self::Unknown => "DESCONOCIDO".to_string(),
        }
    }
}

/// Structured attributes of one policy. Every field has a default, so a record is
/// always complete even when the block matched none of the rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub number: String,
    pub plate: String,
    pub vehicle_type: String,
    pub category: String,
    pub has_life_rider: bool,
    pub has_roadside_rider: bool,
    pub status: PolicyStatus,
    pub description: String,
    #[serde(skip)]
    pub raw_text: String,
}

/// Client-level rollup of all policy labels, as stored in the lookup field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledPolicyText(String);

impl CompiledPolicyText {
    pub const SEPARATOR: &'static str = " | ";

    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Accepts the lookup as a single string or a list of label strings.
    pub fn from_field(value: Option<&Value>) -> Self {
        let text = match value {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(Self::SEPARATOR),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compiled_text_joins_lookup_lists() {
        let value = json!(["\u{2705} VENCE 3D | AAA111", "\u{274C} ANULADA | BBB222"]);
        let compiled = CompiledPolicyText::from_field(Some(&value));
        assert_eq!(
            compiled.as_str(),
            "\u{2705} VENCE 3D | AAA111 | \u{274C} ANULADA | BBB222"
        );
        assert!(CompiledPolicyText::from_field(None).is_empty());
    }

    #[test]
    fn status_labels_follow_label_vocabulary() {
        assert_eq!(PolicyStatus::Expiring { days: 30 }.label(), "VENCE 30D");
        assert_eq!(PolicyStatus::default(), PolicyStatus::Unknown);
        assert_eq!(
            serde_json::to_value(PolicyStatus::Expiring { days: 4 }).expect("serializes"),
            json!({ "state": "expiring", "days": 4 })
        );
    }
}
