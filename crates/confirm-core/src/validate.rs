//! Config validation against a schema.
//!
//! Validation never stops at the first problem: every finding is collected
//! into a [`Report`], tagged with a severity and a category.

use crate::config::{Config, SectionValues};
use crate::schema::{OptionSpec, OptionType, Schema, Section};
use crate::typo::{closest_match, DEFAULT_TYPO_RATIO};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// What kind of problem a finding describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// A required section or option is absent or empty.
    MissingRequired,
    /// A value does not parse as its declared type.
    TypeMismatch,
    /// The schema declares a type the validator does not know.
    InvalidType,
    /// A value fails its validation rule.
    RuleViolation,
    /// A deprecated section or option is used.
    Deprecated,
    /// An expected name is missing but a similar undefined one is present.
    Typo,
    /// A section or option is not declared in the schema.
    Undefined,
    /// An optional option is absent and its default applies.
    DefaultUsed,
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub category: Category,
    pub section: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    /// Human readable description.
    pub message: String,
    /// Likely intended name, for missing entries and typos.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        // Typo warnings already name the suggestion in their message.
        match (&self.category, &self.suggestion) {
            (Category::MissingRequired, Some(suggestion)) => {
                write!(f, " ({suggestion} is a possible typo!)")
            }
            _ => Ok(()),
        }
    }
}

/// Result of validating a config.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    findings: Vec<Finding>,
}

impl Report {
    /// All findings, in the order they were found.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(Severity::Error)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(Severity::Warning)
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages(Severity::Info)
    }

    /// True when there are no errors. Warnings and infos do not count.
    pub fn is_valid(&self) -> bool {
        !self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    /// Findings of one severity.
    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }

    fn messages(&self, severity: Severity) -> Vec<String> {
        self.by_severity(severity).map(|f| f.message.clone()).collect()
    }

    fn push(&mut self, finding: Finding) {
        tracing::debug!(
            severity = ?finding.severity,
            category = ?finding.category,
            section = %finding.section,
            option = finding.option.as_deref().unwrap_or(""),
            "{}",
            finding.message
        );
        self.findings.push(finding);
    }
}

/// Validate `config` against `schema`.
///
/// Deprecated entries are reported as errors when `error_on_deprecated` is
/// set and as warnings otherwise.
pub fn validate(config: &Config, schema: &Schema, error_on_deprecated: bool) -> Report {
    Validator::new(schema, config)
        .error_on_deprecated(error_on_deprecated)
        .validate()
}

/// Walks a schema and a config together and collects findings.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    schema: &'a Schema,
    config: &'a Config,
    error_on_deprecated: bool,
    typo_ratio: f64,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a Schema, config: &'a Config) -> Self {
        Self {
            schema,
            config,
            error_on_deprecated: false,
            typo_ratio: DEFAULT_TYPO_RATIO,
        }
    }

    /// Report deprecated entries as errors instead of warnings.
    pub fn error_on_deprecated(mut self, enabled: bool) -> Self {
        self.error_on_deprecated = enabled;
        self
    }

    /// Minimum similarity for typo suggestions.
    pub fn typo_ratio(mut self, ratio: f64) -> Self {
        self.typo_ratio = ratio;
        self
    }

    pub fn validate(&self) -> Report {
        let mut report = Report::default();

        let names: BTreeSet<&str> = self
            .schema
            .sections
            .iter()
            .map(|s| s.name.as_str())
            .chain(self.config.section_names())
            .collect();

        for name in names {
            match self.schema.section(name) {
                Some(section) => self.check_section(section, &mut report),
                None => report.push(Finding {
                    severity: Severity::Warning,
                    category: Category::Undefined,
                    section: name.to_string(),
                    option: None,
                    message: format!("Section {name} is not defined in the schema file."),
                    suggestion: None,
                }),
            }
        }

        tracing::info!(
            errors = report.by_severity(Severity::Error).count(),
            warnings = report.by_severity(Severity::Warning).count(),
            infos = report.by_severity(Severity::Info).count(),
            "validation finished"
        );
        report
    }

    fn deprecation_severity(&self) -> Severity {
        if self.error_on_deprecated {
            Severity::Error
        } else {
            Severity::Warning
        }
    }

    fn check_section(&self, section: &Section, report: &mut Report) {
        let name = section.name.as_str();
        let values = self.config.section(name);

        let Some(values) = values else {
            // Only undefined sections can be typos, never another schema section.
            let orphans = self
                .config
                .section_names()
                .filter(|candidate| !self.schema.contains_section(candidate));
            let typo = closest_match(name, orphans, self.typo_ratio);

            if section.has_required_option() {
                report.push(Finding {
                    severity: Severity::Error,
                    category: Category::MissingRequired,
                    section: name.to_string(),
                    option: None,
                    message: format!("Missing required section {name}."),
                    suggestion: typo,
                });
            } else if let Some(typo) = typo {
                report.push(Finding {
                    severity: Severity::Warning,
                    category: Category::Typo,
                    section: name.to_string(),
                    option: None,
                    message: format!("Possible typo for section {name} : {typo}."),
                    suggestion: Some(typo),
                });
            }
            return;
        };

        if section.is_deprecated() {
            report.push(Finding {
                severity: self.deprecation_severity(),
                category: Category::Deprecated,
                section: name.to_string(),
                option: None,
                message: format!("Section {name} is deprecated."),
                suggestion: None,
            });
            return;
        }

        let option_names: BTreeSet<&str> = section
            .options
            .iter()
            .map(|o| o.name.as_str())
            .chain(values.keys().map(String::as_str))
            .collect();

        for option_name in option_names {
            match section.option(option_name) {
                Some(option) => self.check_option(section, option, values, report),
                None => report.push(Finding {
                    severity: Severity::Warning,
                    category: Category::Undefined,
                    section: name.to_string(),
                    option: Some(option_name.to_string()),
                    message: format!(
                        "Option {option_name} of section {name} is not defined in the schema file."
                    ),
                    suggestion: None,
                }),
            }
        }
    }

    fn check_option(
        &self,
        section: &Section,
        option: &OptionSpec,
        values: &SectionValues,
        report: &mut Report,
    ) {
        let section_name = section.name.as_str();
        let name = option.name.as_str();
        let value = values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty());
        let finding = |severity, category, message: String| Finding {
            severity,
            category,
            section: section_name.to_string(),
            option: Some(name.to_string()),
            message,
            suggestion: None,
        };

        let Some(value) = value else {
            let orphans = values
                .keys()
                .map(String::as_str)
                .filter(|candidate| !section.contains_option(candidate));
            let typo = closest_match(name, orphans, self.typo_ratio);

            if option.required {
                report.push(Finding {
                    suggestion: typo,
                    ..finding(
                        Severity::Error,
                        Category::MissingRequired,
                        format!("Missing required option {name} in section {section_name}."),
                    )
                });
            } else if let Some(typo) = typo {
                report.push(Finding {
                    suggestion: Some(typo.clone()),
                    ..finding(
                        Severity::Warning,
                        Category::Typo,
                        format!("Possible typo for option {name} : {typo}."),
                    )
                });
            } else if let Some(default) = option.default.as_ref().filter(|_| !option.deprecated) {
                report.push(finding(
                    Severity::Info,
                    Category::DefaultUsed,
                    format!(
                        "Option {name} of section {section_name} is not set, default value {default} will be used."
                    ),
                ));
            }
            return;
        };

        if option.deprecated {
            report.push(finding(
                self.deprecation_severity(),
                Category::Deprecated,
                format!("Option {name} of section {section_name} is deprecated."),
            ));
            return;
        }

        if let Some(kind) = &option.kind {
            match check_type(kind, value) {
                TypeCheck::Valid => {}
                TypeCheck::Invalid => report.push(finding(
                    Severity::Error,
                    Category::TypeMismatch,
                    format!("Invalid value for type {kind} : {value}."),
                )),
                TypeCheck::UnknownType => report.push(finding(
                    Severity::Error,
                    Category::InvalidType,
                    format!("Invalid expected type for option {name} : {kind}."),
                )),
            }
        }

        if let Some(rule) = &option.validation {
            if !rule.check(value) {
                report.push(finding(
                    Severity::Error,
                    Category::RuleViolation,
                    format!("Invalid option value for option {name} : {value}."),
                ));
            }
        }
    }
}

enum TypeCheck {
    Valid,
    Invalid,
    UnknownType,
}

fn check_type(kind: &OptionType, value: &str) -> TypeCheck {
    let valid = match kind {
        OptionType::Int => is_integer(value.trim()),
        OptionType::Float => value.trim().parse::<f64>().is_ok(),
        OptionType::Bool => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "true" | "false" | "1" | "0"
        ),
        OptionType::List | OptionType::Str => true,
        OptionType::Other(_) => return TypeCheck::UnknownType,
    };
    if valid {
        TypeCheck::Valid
    } else {
        TypeCheck::Invalid
    }
}

/// Optional sign followed by digits, with no width limit.
fn is_integer(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
