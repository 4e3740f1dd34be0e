use serde::{Deserialize, Serialize};
use std::fmt;

/// Queryable attributes of a tree node.
///
/// Identity for condition handling is the canonical programmatic name, not
/// variant identity: two fluent methods that map to the same programmatic
/// name address the same property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyId {
    /// Display name of the node.
    Name,
    /// Stable identifier assigned by the UI framework.
    AutomationId,
    /// Implementation class name of the node.
    ClassName,
    /// Tooltip / help text attached to the node.
    HelpText,
    /// Broad control category ("Button", "Slider", ...).
    ControlType,
    /// Whether the control currently accepts interaction.
    IsEnabled,
}

impl PropertyId {
    /// Canonical programmatic name of the property.
    pub fn programmatic_name(&self) -> &'static str {
        match self {
            PropertyId::Name => "NameProperty",
            PropertyId::AutomationId => "AutomationIdProperty",
            PropertyId::ClassName => "ClassNameProperty",
            PropertyId::HelpText => "HelpTextProperty",
            PropertyId::ControlType => "ControlTypeProperty",
            PropertyId::IsEnabled => "IsEnabledProperty",
        }
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.programmatic_name())
    }
}

/// The target or actual value of a node property.
///
/// Comparison is case-insensitive for strings and exact for everything else.
/// A value whose type does not match the property's actual type never
/// matches; no type validation happens at the query layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl PropertyValue {
    /// Equality as used by property conditions.
    pub fn matches(&self, other: &PropertyValue) -> bool {
        match (self, other) {
            (PropertyValue::Str(a), PropertyValue::Str(b)) => a.to_lowercase() == b.to_lowercase(),
            (PropertyValue::Bool(a), PropertyValue::Bool(b)) => a == b,
            (PropertyValue::Int(a), PropertyValue::Int(b)) => a == b,
            (PropertyValue::Float(a), PropertyValue::Float(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Str(s) => f.write_str(s),
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Int(i) => write!(f, "{}", i),
            PropertyValue::Float(x) => write!(f, "{}", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_match_case_insensitive() {
        let a = PropertyValue::from("Submit");
        let b = PropertyValue::from("SUBMIT");
        assert!(a.matches(&b));
    }

    #[test]
    fn test_string_match_rejects_different_text() {
        let a = PropertyValue::from("Submit");
        let b = PropertyValue::from("Cancel");
        assert!(!a.matches(&b));
    }

    #[test]
    fn test_mismatched_types_never_match() {
        let a = PropertyValue::from("true");
        let b = PropertyValue::from(true);
        assert!(!a.matches(&b));
        assert!(!PropertyValue::from(1i64).matches(&PropertyValue::from(1.0)));
    }

    #[test]
    fn test_bool_and_numeric_match_exact() {
        assert!(PropertyValue::from(true).matches(&PropertyValue::from(true)));
        assert!(PropertyValue::from(42i64).matches(&PropertyValue::from(42i64)));
        assert!(PropertyValue::from(0.5).matches(&PropertyValue::from(0.5)));
    }

    #[test]
    fn test_programmatic_names_are_distinct() {
        let ids = [
            PropertyId::Name,
            PropertyId::AutomationId,
            PropertyId::ClassName,
            PropertyId::HelpText,
            PropertyId::ControlType,
            PropertyId::IsEnabled,
        ];
        for (i, a) in ids.iter().enumerate() {
            for b in ids.iter().skip(i + 1) {
                assert_ne!(a.programmatic_name(), b.programmatic_name());
            }
        }
    }
}
