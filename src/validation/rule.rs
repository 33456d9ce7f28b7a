//! Declarative parameter rules.

use serde::{Deserialize, Serialize};

use crate::validation::value::{Value, ValueType};

/// Source selector separator inside a rule key (`token|header`).
pub const SELECTOR_SEPARATOR: char = '|';

/// Selector reading from request headers.
pub const HEADER_SELECTOR: &str = "header";

/// The named check a rule applies after coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Check {
    /// No check; the rule always succeeds.
    #[default]
    None,
    /// Value must be present and not an empty string.
    Required,
    /// Value must equal one of the rule's `enum` members.
    Include,
    /// Unrecognised check name. Always fails.
    Unknown(String),
}

impl From<String> for Check {
    fn from(name: String) -> Self {
        match name.as_str() {
            "" => Check::None,
            "required" => Check::Required,
            "include" => Check::Include,
            _ => Check::Unknown(name),
        }
    }
}

impl From<&str> for Check {
    fn from(name: &str) -> Self {
        Check::from(name.to_string())
    }
}

impl From<Check> for String {
    fn from(check: Check) -> Self {
        match check {
            Check::None => String::new(),
            Check::Required => "required".to_string(),
            Check::Include => "include".to_string(),
            Check::Unknown(name) => name,
        }
    }
}

/// Constraint plus type/default metadata for one request field.
///
/// ```yaml
/// - key: age
///   type: int
///   rule: required
/// - key: token|header
///   msg: missing token
///   rule: required
/// - key: role
///   rule: include
///   enum: [admin, user]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rule {
    /// Field name, optionally followed by `|header`.
    pub key: String,

    #[serde(rename = "type")]
    pub value_type: ValueType,

    #[serde(rename = "rule")]
    pub check: Check,

    /// Custom failure message.
    pub msg: String,

    /// Used when the request carries no value for the key.
    pub default: Option<Value>,

    #[serde(rename = "enum")]
    pub allowed: Vec<Value>,
}

impl Rule {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, value_type: impl Into<ValueType>) -> Self {
        self.value_type = value_type.into();
        self
    }

    pub fn with_check(mut self, check: impl Into<Check>) -> Self {
        self.check = check.into();
        self
    }

    pub fn required(self) -> Self {
        self.with_check(Check::Required)
    }

    pub fn include<I, V>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.check = Check::Include;
        self.allowed = allowed.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.msg = msg.into();
        self
    }

    /// Apply the rule's check to an already coerced value.
    pub fn accepts(&self, value: &Value) -> bool {
        match &self.check {
            Check::None => true,
            Check::Required => match value {
                Value::Absent => false,
                Value::String(s) => !s.is_empty(),
                _ => true,
            },
            Check::Include => self.allowed.iter().any(|allowed| allowed == value),
            Check::Unknown(_) => false,
        }
    }

    /// Failure message for `resolved_key`.
    pub fn failure_message(&self, resolved_key: &str) -> String {
        if self.msg.is_empty() {
            format!("Parameter [{}] validate error", resolved_key)
        } else {
            self.msg.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_check() {
        let rule = Rule::new("name").required();
        assert!(!rule.accepts(&Value::Absent));
        assert!(!rule.accepts(&Value::from("")));
        assert!(rule.accepts(&Value::from("bob")));
        assert!(rule.accepts(&Value::Int(0)));
        assert!(rule.accepts(&Value::Bool(false)));
    }

    #[test]
    fn test_include_is_strict() {
        let rule = Rule::new("level").include([1i64, 2]);
        assert!(rule.accepts(&Value::Int(2)));
        assert!(!rule.accepts(&Value::from("2")));
        assert!(!rule.accepts(&Value::Int(3)));
    }

    #[test]
    fn test_unknown_check_always_fails() {
        let rule = Rule::new("email").with_check("email");
        assert_eq!(rule.check, Check::Unknown("email".into()));
        assert!(!rule.accepts(&Value::from("a@b.c")));
    }

    #[test]
    fn test_failure_message() {
        assert_eq!(
            Rule::new("age").failure_message("age"),
            "Parameter [age] validate error"
        );
        assert_eq!(
            Rule::new("age").with_message("age is required").failure_message("age"),
            "age is required"
        );
    }

    #[test]
    fn test_deserialize_rules() {
        let yaml = r#"
- key: age
  type: int
  default: 18
- key: role
  rule: include
  enum: [admin, user]
- key: token|header
  rule: required
  msg: missing token
"#;
        let rules: Vec<Rule> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rules[0].value_type, ValueType::Int);
        assert_eq!(rules[0].default, Some(Value::Int(18)));
        assert_eq!(rules[0].check, Check::None);
        assert_eq!(rules[1].check, Check::Include);
        assert_eq!(rules[1].allowed, vec![Value::from("admin"), Value::from("user")]);
        assert_eq!(rules[2].key, "token|header");
        assert_eq!(rules[2].msg, "missing token");
    }
}
