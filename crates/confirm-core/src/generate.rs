//! Config skeleton, documentation and schema generation.

use crate::config::Config;
use crate::schema::{OptionSpec, Schema, Section};

/// Value written for options that have neither a value nor a default.
pub const PLACEHOLDER: &str = "TO FILL";

/// Description used when the schema has none.
pub const NO_DESCRIPTION: &str = "No description provided.";

/// Build an INI config skeleton from a schema.
///
/// Only required options and options with an existing value are written,
/// unless `include_all` is set. Sections and options are sorted by name so
/// regenerated files diff cleanly; sections left without options are omitted.
pub fn build_config_skeleton(schema: &Schema, include_all: bool) -> String {
    let mut sections: Vec<&Section> = schema.sections.iter().collect();
    sections.sort_by(|a, b| a.name.cmp(&b.name));

    let mut blocks = Vec::new();
    for section in sections {
        let mut options: Vec<&OptionSpec> = section
            .options
            .iter()
            .filter(|o| include_all || o.required || o.value.is_some())
            .collect();
        if options.is_empty() {
            continue;
        }
        options.sort_by(|a, b| a.name.cmp(&b.name));

        let entries: Vec<String> = options.into_iter().map(skeleton_entry).collect();
        blocks.push(format!("[{}]\n{}", section.name, entries.join("\n")));
    }

    blocks.join("\n")
}

fn skeleton_entry(option: &OptionSpec) -> String {
    let mut entry = String::new();
    if option.required {
        entry.push_str("# REQUIRED\n");
    }
    if option.deprecated {
        entry.push_str("# DEPRECATED\n");
    }
    let description = option.description.as_deref().unwrap_or(NO_DESCRIPTION);
    for line in description.lines() {
        entry.push_str(&format!("# {line}\n"));
    }

    let value = option
        .value
        .as_deref()
        .or(option.default.as_deref())
        .unwrap_or(PLACEHOLDER);
    // Continuation lines must be indented to be read back as one value
    entry.push_str(&format!("{} = {}\n", option.name, value.replace('\n', "\n\t")));
    entry
}

/// Build reStructuredText documentation, in schema order.
pub fn build_documentation(schema: &Schema) -> String {
    let mut doc = heading("Configuration documentation", '-');

    for section in &schema.sections {
        doc.push('\n');
        doc.push_str(&heading(&section.name, '='));

        for option in &section.options {
            doc.push('\n');
            doc.push_str(&heading(&option.name, '='));
            if option.required {
                doc.push_str("** This option is required! **\n");
            }
            if option.deprecated {
                doc.push_str("** This option is deprecated! **\n");
            }
            if let Some(kind) = &option.kind {
                doc.push_str(&format!("*Type : {kind}.*\n"));
            }
            if let Some(description) = &option.description {
                doc.push_str(description.trim_end());
                doc.push('\n');
            }
            if let Some(default) = &option.default {
                doc.push_str(&format!("The default value is {default}.\n"));
            }
        }
    }

    doc
}

fn heading(text: &str, underline: char) -> String {
    let line: String = std::iter::repeat_n(underline, text.chars().count()).collect();
    format!("{text}\n{line}\n")
}

/// Build a bare schema from an existing config.
///
/// Every option found becomes a required option with a placeholder
/// description, ready to be filled in by hand.
pub fn reverse_engineer_schema(config: &Config) -> Schema {
    let mut schema = Schema::default();
    for (section_name, values) in config.sections() {
        let section = schema.section_mut(section_name);
        for option_name in values.keys() {
            let option = section.option_mut(option_name);
            option.required = true;
            option.description = Some(NO_DESCRIPTION.to_string());
        }
    }
    schema
}

/// Copy config values into a new schema, for migration.
///
/// Options the schema does not know about are carried over as plain
/// options so no value is lost. The input schema is left untouched.
pub fn append_existing_values(schema: &Schema, config: &Config) -> Schema {
    let mut merged = schema.clone();
    for (section_name, values) in config.sections() {
        let section = merged.section_mut(section_name);
        for (option_name, value) in values {
            if !section.contains_option(option_name) {
                tracing::debug!(
                    section = section_name,
                    option = %option_name,
                    "carrying over option not defined in schema"
                );
            }
            section.option_mut(option_name).value = Some(value.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_ini;

    fn schema(yaml: &str) -> Schema {
        Schema::from_str(yaml).unwrap()
    }

    #[test]
    fn empty_schema() {
        assert_eq!(build_config_skeleton(&Schema::default(), true), "");
    }

    #[test]
    fn required_without_default() {
        let output = build_config_skeleton(&schema("section:\n  option:\n    required: true\n"), false);
        assert_eq!(
            output,
            "[section]\n# REQUIRED\n# No description provided.\noption = TO FILL\n"
        );
    }

    #[test]
    fn required_with_default() {
        let output = build_config_skeleton(
            &schema("section:\n  option:\n    required: true\n    default: 12\n"),
            false,
        );
        assert!(output.contains("option = 12\n"));
    }

    #[test]
    fn existing_value_beats_default() {
        let output = build_config_skeleton(
            &schema("section:\n  option:\n    required: true\n    default: 12\n    value: 25\n"),
            false,
        );
        assert!(output.contains("option = 25\n"));
        assert!(!output.contains("option = 12"));
    }

    #[test]
    fn several_options() {
        let yaml = r#"
            section:
              optionb:
                required: true
                default: DB
              optiona:
                required: true
                default: DA
                value: VA
        "#;

        let output = build_config_skeleton(&schema(yaml), false);
        assert!(output.contains("optiona = VA\n"));
        assert!(output.contains("optionb = DB\n"));
        assert!(output.find("optiona").unwrap() < output.find("optionb").unwrap());
    }

    #[test]
    fn include_all() {
        let yaml = r#"
            section:
              optiona:
                required: true
                value: VA
              optionb:
                default: DB
        "#;

        let output = build_config_skeleton(&schema(yaml), false);
        assert!(!output.contains("optionb"));

        let output = build_config_skeleton(&schema(yaml), true);
        assert!(output.contains("optionb = DB\n"));
    }

    #[test]
    fn skips_sections_without_selected_options() {
        let output = build_config_skeleton(&schema("optional:\n  a: {}\nempty:\n"), false);
        assert_eq!(output, "");
    }

    #[test]
    fn sections_are_sorted() {
        let output = build_config_skeleton(&schema("b:\n  x: {}\na:\n  y: {}\n"), true);
        assert!(output.starts_with("[a]\n"));
        assert!(output.contains("\n[b]\n"));
    }

    #[test]
    fn deprecated_and_description_comments() {
        let yaml = "s:\n  old:\n    deprecated: true\n    description: Use new instead.\n";

        let output = build_config_skeleton(&schema(yaml), true);
        assert_eq!(output, "[s]\n# DEPRECATED\n# Use new instead.\nold = TO FILL\n");
    }

    #[test]
    fn skeleton_parses_back() {
        let yaml = "s:\n  a: {required: true, default: 1}\n  b: {value: \"x\\ny\"}\n";

        let config = parse_ini(&build_config_skeleton(&schema(yaml), true)).unwrap();
        assert_eq!(config.get("s", "a"), Some("1"));
        assert_eq!(config.get("s", "b"), Some("x\ny"));
    }

    #[test]
    fn documentation_basic() {
        let yaml = r#"
            "section":
                "option":
                    "required": true
                    "description": "This is a description."
        "#;

        let expected = concat!(
            "Configuration documentation\n---------------------------\n\n",
            "section\n=======\n\n",
            "option\n======\n** This option is required! **\nThis is a description.\n",
        );
        assert_eq!(build_documentation(&schema(yaml)), expected);
    }

    #[test]
    fn documentation_with_type() {
        let yaml = r#"
            "section":
                "option":
                    "required": true
                    "type": "bool"
        "#;

        let expected = concat!(
            "Configuration documentation\n---------------------------\n\n",
            "section\n=======\n\n",
            "option\n======\n** This option is required! **\n*Type : bool.*\n",
        );
        assert_eq!(build_documentation(&schema(yaml)), expected);
    }

    #[test]
    fn documentation_keeps_schema_order() {
        let yaml = "zeta:\n  b:\n    default: 3\n    deprecated: true\n  a: {}\nalpha:\n";

        let doc = build_documentation(&schema(yaml));
        assert!(doc.find("zeta").unwrap() < doc.find("alpha").unwrap());
        assert!(doc.find("\nb\n").unwrap() < doc.find("\na\n").unwrap());
        assert!(doc.contains("b\n=\n** This option is deprecated! **\nThe default value is 3.\n"));
    }

    #[test]
    fn documentation_annotation_order() {
        let yaml = r#"
            s:
              o:
                required: true
                deprecated: true
                type: int
                description: D
                default: 1
        "#;

        let expected = concat!(
            "o\n=\n",
            "** This option is required! **\n",
            "** This option is deprecated! **\n",
            "*Type : int.*\n",
            "D\n",
            "The default value is 1.\n",
        );
        assert!(build_documentation(&schema(yaml)).ends_with(expected));
    }

    #[test]
    fn reverse_engineer() {
        let config = parse_ini("[server]\nport = 80\nhost = x\n[empty]\n").unwrap();

        let schema = reverse_engineer_schema(&config);
        let port = schema.option("server", "port").unwrap();
        assert!(port.required);
        assert_eq!(port.description.as_deref(), Some(NO_DESCRIPTION));
        assert!(schema.section("empty").unwrap().options.is_empty());
    }

    #[test]
    fn reverse_engineered_skeleton_has_every_key() {
        let config = parse_ini("[a]\nx = 1\ny = 2\n[b]\nz = 3\n").unwrap();

        let output = build_config_skeleton(&reverse_engineer_schema(&config), true);
        for (section, values) in config.sections() {
            assert!(output.contains(&format!("[{section}]")));
            for option in values.keys() {
                assert!(output.contains(&format!("\n{option} = ")));
            }
        }
    }

    #[test]
    fn reverse_engineered_schema_yaml() {
        let config = parse_ini("[s]\no = 1\n").unwrap();

        let yaml = reverse_engineer_schema(&config).to_yaml().unwrap();
        let again = Schema::from_str(&yaml).unwrap();
        assert!(again.option("s", "o").unwrap().required);
    }

    #[test]
    fn migrate_merges_values() {
        let original = schema("s:\n  keep: {required: true}\n  optional: {default: d}\n");
        let config = parse_ini("[s]\nkeep = k\nextra = e\n").unwrap();

        let merged = append_existing_values(&original, &config);
        assert_eq!(merged.option("s", "keep").unwrap().value.as_deref(), Some("k"));
        assert_eq!(merged.option("s", "extra").unwrap().value.as_deref(), Some("e"));
        assert_eq!(original.option("s", "keep").unwrap().value, None);
        assert!(original.option("s", "extra").is_none());

        let output = build_config_skeleton(&merged, false);
        assert!(output.contains("keep = k\n"));
        assert!(output.contains("extra = e\n"));
        assert!(!output.contains("optional"));
    }
}
