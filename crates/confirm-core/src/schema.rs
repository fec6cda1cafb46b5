//! Schema model and parsing of YAML schema files.
//!
//! A schema is a two-level YAML mapping:
//!
//! ```yaml
//! server:
//!   port:
//!     required: true
//!     type: int
//!     default: 8080
//!     description: Port to listen on.
//!   legacy_mode:
//!     deprecated: true
//! ```
//!
//! Sections and options keep the order they were written in.

use crate::rule::Rule;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::path::Path;

/// A parsed schema, in authoring order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Schema sections.
    pub sections: Vec<Section>,
}

/// A schema section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    /// Section name.
    pub name: String,
    /// Options declared for this section.
    pub options: Vec<OptionSpec>,
}

/// Metadata for a single option.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSpec {
    /// Option name.
    pub name: String,
    pub required: bool,
    pub deprecated: bool,
    /// Expected value type, `None` when unchecked.
    pub kind: Option<OptionType>,
    /// Default value used when the option is not set.
    pub default: Option<String>,
    pub description: Option<String>,
    /// Extra predicate the value must satisfy.
    pub validation: Option<Rule>,
    /// Existing value, filled in when migrating a config.
    pub value: Option<String>,
}

/// Declared option type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionType {
    Int,
    Float,
    Bool,
    List,
    Str,
    /// A type name the validator does not know about.
    Other(String),
}

/// Errors that can occur when loading a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read schema: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse schema: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("schema must be a mapping of sections, found {0}")]
    NotAMapping(&'static str),
    #[error("section '{section}' must be a mapping of options, found {found}")]
    InvalidSection {
        section: String,
        found: &'static str,
    },
    #[error("invalid option '{option}' in section '{section}': {message}")]
    InvalidOption {
        section: String,
        option: String,
        message: String,
    },
    #[error("invalid name in schema: {0}")]
    InvalidName(String),
}

/// Option attributes as written in the schema file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOption {
    required: bool,
    deprecated: bool,
    #[serde(rename = "type")]
    kind: Option<String>,
    default: Option<Value>,
    description: Option<String>,
    validation: Option<Value>,
    value: Option<Value>,
}

impl Schema {
    /// Load a schema from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_str(&contents)
    }

    /// Parse a schema from a YAML string.
    pub fn from_str(s: &str) -> Result<Self, SchemaError> {
        let document: Value = serde_yaml::from_str(s)?;
        let mapping = match document {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(mapping) => mapping,
            other => return Err(SchemaError::NotAMapping(kind_name(&other))),
        };

        let mut sections = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let name = key_name(&key)?;
            let options = match value {
                Value::Null => Vec::new(),
                Value::Mapping(options) => parse_options(&name, options)?,
                other => {
                    return Err(SchemaError::InvalidSection {
                        section: name,
                        found: kind_name(&other),
                    });
                }
            };
            sections.push(Section { name, options });
        }

        Ok(Self { sections })
    }

    /// Render the schema back to YAML, keeping section and option order.
    pub fn to_yaml(&self) -> Result<String, SchemaError> {
        let mut root = Mapping::new();
        for section in &self.sections {
            let mut options = Mapping::new();
            for option in &section.options {
                options.insert(
                    Value::from(option.name.as_str()),
                    Value::Mapping(option.to_mapping()),
                );
            }
            root.insert(Value::from(section.name.as_str()), Value::Mapping(options));
        }
        Ok(serde_yaml::to_string(&Value::Mapping(root))?)
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Look up an option by section and option name.
    pub fn option(&self, section: &str, option: &str) -> Option<&OptionSpec> {
        self.section(section).and_then(|s| s.option(option))
    }

    pub fn contains_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Get a section for modification, appending an empty one if needed.
    pub fn section_mut(&mut self, name: &str) -> &mut Section {
        let index = match self.sections.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.sections.push(Section {
                    name: name.to_string(),
                    options: Vec::new(),
                });
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Section {
    /// Look up an option by name.
    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Get an option for modification, appending a bare one if needed.
    pub fn option_mut(&mut self, name: &str) -> &mut OptionSpec {
        let index = match self.options.iter().position(|o| o.name == name) {
            Some(index) => index,
            None => {
                self.options.push(OptionSpec::new(name));
                self.options.len() - 1
            }
        };
        &mut self.options[index]
    }

    pub fn contains_option(&self, name: &str) -> bool {
        self.option(name).is_some()
    }

    pub fn has_required_option(&self) -> bool {
        self.options.iter().any(|o| o.required)
    }

    /// A section is deprecated when it declares options and all of them are.
    pub fn is_deprecated(&self) -> bool {
        !self.options.is_empty() && self.options.iter().all(|o| o.deprecated)
    }
}

impl OptionSpec {
    /// Create an option with no attributes set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn from_raw(section: &str, name: String, raw: RawOption) -> Result<Self, SchemaError> {
        let validation = raw
            .validation
            .as_ref()
            .map(Rule::from_yaml)
            .transpose()
            .map_err(|message| SchemaError::InvalidOption {
                section: section.to_string(),
                option: name.clone(),
                message,
            })?;

        Ok(Self {
            required: raw.required,
            deprecated: raw.deprecated,
            kind: raw.kind.as_deref().map(OptionType::parse),
            default: raw.default.as_ref().and_then(scalar_to_string),
            description: raw.description,
            validation,
            value: raw.value.as_ref().and_then(scalar_to_string),
            name,
        })
    }

    fn to_mapping(&self) -> Mapping {
        let mut map = Mapping::new();
        if self.required {
            map.insert("required".into(), Value::Bool(true));
        }
        if self.deprecated {
            map.insert("deprecated".into(), Value::Bool(true));
        }
        if let Some(kind) = &self.kind {
            map.insert("type".into(), Value::from(kind.to_string()));
        }
        if let Some(default) = &self.default {
            map.insert("default".into(), Value::from(default.as_str()));
        }
        if let Some(description) = &self.description {
            map.insert("description".into(), Value::from(description.as_str()));
        }
        if let Some(validation) = &self.validation {
            map.insert("validation".into(), validation.to_yaml());
        }
        if let Some(value) = &self.value {
            map.insert("value".into(), Value::from(value.as_str()));
        }
        map
    }
}

impl OptionType {
    /// Parse a declared type name. Unknown names are kept as [`OptionType::Other`].
    pub fn parse(name: &str) -> Self {
        match name {
            "int" => Self::Int,
            "float" => Self::Float,
            "bool" => Self::Bool,
            "list" => Self::List,
            "str" => Self::Str,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::List => "list",
            Self::Str => "str",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_options(section: &str, mapping: Mapping) -> Result<Vec<OptionSpec>, SchemaError> {
    let mut options = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let name = key_name(&key)?;
        let raw = match value {
            Value::Null => RawOption::default(),
            value @ Value::Mapping(_) => {
                serde_yaml::from_value(value).map_err(|e| SchemaError::InvalidOption {
                    section: section.to_string(),
                    option: name.clone(),
                    message: e.to_string(),
                })?
            }
            other => {
                return Err(SchemaError::InvalidOption {
                    section: section.to_string(),
                    option: name,
                    message: format!("expected a mapping, found {}", kind_name(&other)),
                });
            }
        };
        options.push(OptionSpec::from_raw(section, name, raw)?);
    }
    Ok(options)
}

fn key_name(key: &Value) -> Result<String, SchemaError> {
    scalar_to_string(key)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| SchemaError::InvalidName(format!("{key:?}")))
}

/// Stringify a YAML scalar. Returns `None` for null and non-scalars.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        _ => None,
    }
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
