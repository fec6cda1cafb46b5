//! Confirm core: schema parsing, config validation, and template generation.
//!
//! Confirm checks INI and YAML configuration files against a two-level
//! YAML schema (section -> option -> metadata), and can generate config
//! skeletons and reStructuredText documentation from the same schema.

mod config;
mod generate;
mod loader;
mod rule;
mod schema;
mod settings;
mod typo;
mod validate;

pub use config::{Config, SectionValues};
pub use generate::{
    append_existing_values, build_config_skeleton, build_documentation, reverse_engineer_schema,
    NO_DESCRIPTION, PLACEHOLDER,
};
pub use loader::{load_config, parse_config, parse_ini, parse_yaml, ConfigFormat, LoadError};
pub use rule::Rule;
pub use schema::{OptionSpec, OptionType, Schema, SchemaError, Section};
pub use settings::{Settings, ValidateSettings};
pub use typo::{closest_match, similarity, DEFAULT_TYPO_RATIO};
pub use validate::{validate, Category, Finding, Report, Severity, Validator};
