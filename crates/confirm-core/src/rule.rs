//! Validation rules attached to schema options.
//!
//! A rule is a small predicate over an option's raw string value, written in
//! the schema as a single-key mapping:
//!
//! ```yaml
//! port:
//!   type: int
//!   validation:
//!     all:
//!       - ge: 1
//!       - le: 65535
//! ```
//!
//! The grammar is closed: there is no way to run arbitrary code from a schema.

use serde_yaml::{Mapping, Value};

/// A predicate over an option's raw value.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Numeric value strictly greater than.
    Gt(f64),
    /// Numeric value greater than or equal to.
    Ge(f64),
    /// Numeric value strictly lower than.
    Lt(f64),
    /// Numeric value lower than or equal to.
    Le(f64),
    /// Exact string equality.
    Eq(String),
    /// String inequality.
    Ne(String),
    /// Value is one of the listed strings.
    In(Vec<String>),
    /// Value is none of the listed strings.
    NotIn(Vec<String>),
    /// At least this many characters.
    MinLength(usize),
    /// At most this many characters.
    MaxLength(usize),
    StartsWith(String),
    EndsWith(String),
    Contains(String),
    /// Every inner rule holds.
    All(Vec<Rule>),
    /// At least one inner rule holds.
    Any(Vec<Rule>),
    /// The inner rule does not hold.
    Not(Box<Rule>),
}

impl Rule {
    /// Decode a rule from its YAML form.
    pub fn from_yaml(value: &Value) -> Result<Self, String> {
        let map = value
            .as_mapping()
            .ok_or_else(|| "a rule must be a mapping with a single operator".to_string())?;
        if map.len() != 1 {
            return Err(format!(
                "a rule must have exactly one operator, found {}",
                map.len()
            ));
        }
        let (key, operand) = map
            .iter()
            .next()
            .ok_or_else(|| "empty rule".to_string())?;
        let op = key
            .as_str()
            .ok_or_else(|| "rule operator must be a string".to_string())?;

        let rule = match op {
            "gt" => Self::Gt(number(op, operand)?),
            "ge" => Self::Ge(number(op, operand)?),
            "lt" => Self::Lt(number(op, operand)?),
            "le" => Self::Le(number(op, operand)?),
            "eq" => Self::Eq(text(op, operand)?),
            "ne" => Self::Ne(text(op, operand)?),
            "in" => Self::In(texts(op, operand)?),
            "not_in" => Self::NotIn(texts(op, operand)?),
            "min_length" => Self::MinLength(length(op, operand)?),
            "max_length" => Self::MaxLength(length(op, operand)?),
            "starts_with" => Self::StartsWith(text(op, operand)?),
            "ends_with" => Self::EndsWith(text(op, operand)?),
            "contains" => Self::Contains(text(op, operand)?),
            "all" => Self::All(rules(op, operand)?),
            "any" => Self::Any(rules(op, operand)?),
            "not" => Self::Not(Box::new(Self::from_yaml(operand)?)),
            other => return Err(format!("unknown rule operator '{other}'")),
        };
        Ok(rule)
    }

    /// Encode the rule back to its YAML form.
    pub fn to_yaml(&self) -> Value {
        let (op, operand) = match self {
            Self::Gt(n) => ("gt", Value::from(*n)),
            Self::Ge(n) => ("ge", Value::from(*n)),
            Self::Lt(n) => ("lt", Value::from(*n)),
            Self::Le(n) => ("le", Value::from(*n)),
            Self::Eq(s) => ("eq", Value::from(s.as_str())),
            Self::Ne(s) => ("ne", Value::from(s.as_str())),
            Self::In(items) => ("in", string_seq(items)),
            Self::NotIn(items) => ("not_in", string_seq(items)),
            Self::MinLength(n) => ("min_length", Value::from(*n as u64)),
            Self::MaxLength(n) => ("max_length", Value::from(*n as u64)),
            Self::StartsWith(s) => ("starts_with", Value::from(s.as_str())),
            Self::EndsWith(s) => ("ends_with", Value::from(s.as_str())),
            Self::Contains(s) => ("contains", Value::from(s.as_str())),
            Self::All(rules) => ("all", Value::Sequence(rules.iter().map(Self::to_yaml).collect())),
            Self::Any(rules) => ("any", Value::Sequence(rules.iter().map(Self::to_yaml).collect())),
            Self::Not(rule) => ("not", rule.to_yaml()),
        };
        let mut map = Mapping::new();
        map.insert(Value::from(op), operand);
        Value::Mapping(map)
    }

    /// Check a raw option value against this rule.
    ///
    /// Numeric comparisons fail on values that do not parse as numbers.
    pub fn check(&self, value: &str) -> bool {
        match self {
            Self::Gt(n) => parse_number(value).is_some_and(|v| v > *n),
            Self::Ge(n) => parse_number(value).is_some_and(|v| v >= *n),
            Self::Lt(n) => parse_number(value).is_some_and(|v| v < *n),
            Self::Le(n) => parse_number(value).is_some_and(|v| v <= *n),
            Self::Eq(s) => value == s,
            Self::Ne(s) => value != s,
            Self::In(items) => items.iter().any(|item| item == value),
            Self::NotIn(items) => !items.iter().any(|item| item == value),
            Self::MinLength(n) => value.chars().count() >= *n,
            Self::MaxLength(n) => value.chars().count() <= *n,
            Self::StartsWith(s) => value.starts_with(s.as_str()),
            Self::EndsWith(s) => value.ends_with(s.as_str()),
            Self::Contains(s) => value.contains(s.as_str()),
            Self::All(rules) => rules.iter().all(|rule| rule.check(value)),
            Self::Any(rules) => rules.iter().any(|rule| rule.check(value)),
            Self::Not(rule) => !rule.check(value),
        }
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

fn string_seq(items: &[String]) -> Value {
    Value::Sequence(items.iter().map(|s| Value::from(s.as_str())).collect())
}

fn number(op: &str, operand: &Value) -> Result<f64, String> {
    match operand {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
    .ok_or_else(|| format!("operator '{op}' expects a number"))
}

fn length(op: &str, operand: &Value) -> Result<usize, String> {
    operand
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| format!("operator '{op}' expects a non-negative integer"))
}

fn text(op: &str, operand: &Value) -> Result<String, String> {
    crate::schema::scalar_to_string(operand)
        .ok_or_else(|| format!("operator '{op}' expects a scalar value"))
}

fn texts(op: &str, operand: &Value) -> Result<Vec<String>, String> {
    operand
        .as_sequence()
        .ok_or_else(|| format!("operator '{op}' expects a list"))?
        .iter()
        .map(|item| text(op, item))
        .collect()
}

fn rules(op: &str, operand: &Value) -> Result<Vec<Rule>, String> {
    operand
        .as_sequence()
        .ok_or_else(|| format!("operator '{op}' expects a list of rules"))?
        .iter()
        .map(Rule::from_yaml)
        .collect()
}
