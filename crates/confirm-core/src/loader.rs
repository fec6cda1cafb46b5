//! Loading config files (INI or YAML) into a [`Config`].

use crate::config::Config;
use crate::schema::{kind_name, scalar_to_string};
use serde_yaml::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Supported config file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Ini,
}

impl ConfigFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "ini" | "conf" | "cfg" => Some(Self::Ini),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => f.write_str("yaml"),
            Self::Ini => f.write_str("ini"),
        }
    }
}

/// Errors that can occur when loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config structure: {0}")]
    Structure(String),
    #[error("invalid INI at line {line}: {message}")]
    Ini { line: usize, message: String },
    #[error("could not parse config as YAML ({yaml}) or INI ({ini})")]
    UnknownFormat {
        yaml: Box<LoadError>,
        ini: Box<LoadError>,
    },
}

/// Load a config file, picking the format from its extension.
///
/// Files with an unknown extension are tried as YAML first, then as INI.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, LoadError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let format = ConfigFormat::from_path(path);
    tracing::debug!(path = %path.display(), ?format, "loading config");
    parse_config(&contents, format)
}

/// Parse config text in the given format, or sniff it when `None`.
pub fn parse_config(contents: &str, format: Option<ConfigFormat>) -> Result<Config, LoadError> {
    match format {
        Some(ConfigFormat::Yaml) => parse_yaml(contents),
        Some(ConfigFormat::Ini) => parse_ini(contents),
        None => match parse_yaml(contents) {
            Ok(config) => Ok(config),
            Err(yaml) => {
                tracing::debug!(error = %yaml, "not YAML, trying INI");
                parse_ini(contents).map_err(|ini| LoadError::UnknownFormat {
                    yaml: Box::new(yaml),
                    ini: Box::new(ini),
                })
            }
        },
    }
}

/// Parse a YAML config: a mapping of sections, each a mapping of scalars.
///
/// Lists of scalars are joined with `", "` so that they read as `list` values.
pub fn parse_yaml(contents: &str) -> Result<Config, LoadError> {
    let document: Value = serde_yaml::from_str(contents)?;
    let mapping = match document {
        Value::Null => return Ok(Config::new()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(LoadError::Structure(format!(
                "expected a mapping of sections, found {}",
                kind_name(&other)
            )));
        }
    };

    let mut config = Config::new();
    for (key, value) in &mapping {
        let section = yaml_key(key)?;
        let options = match value {
            Value::Null => {
                config.ensure_section(section);
                continue;
            }
            Value::Mapping(options) => options,
            other => {
                return Err(LoadError::Structure(format!(
                    "section '{section}' must be a mapping, found {}",
                    kind_name(other)
                )));
            }
        };

        let values = config.ensure_section(section.clone());
        for (key, value) in options {
            let option = yaml_key(key)?;
            let value = yaml_value(value).ok_or_else(|| {
                LoadError::Structure(format!(
                    "option '{option}' in section '{section}' must be a scalar or a list, found {}",
                    kind_name(value)
                ))
            })?;
            values.insert(option, value);
        }
    }

    Ok(config)
}

fn yaml_key(key: &Value) -> Result<String, LoadError> {
    scalar_to_string(key)
        .ok_or_else(|| LoadError::Structure(format!("keys must be scalars, found {}", kind_name(key))))
}

fn yaml_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Sequence(items) => items
            .iter()
            .map(scalar_to_string)
            .collect::<Option<Vec<_>>>()
            .map(|items| items.join(", ")),
        other => scalar_to_string(other),
    }
}

/// Parse an INI config.
///
/// Supports `[section]` headers, `key = value` and `key: value` pairs, keys
/// without a value (read as empty), `#` and `;` comment lines, and indented
/// continuation lines, which are joined to the previous value with a newline.
pub fn parse_ini(contents: &str) -> Result<Config, LoadError> {
    let mut config = Config::new();
    let mut section: Option<String> = None;
    let mut last_option: Option<String> = None;

    for (index, raw) in contents.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_end();
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            last_option = None;
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        // Continuation of the previous value
        if line.len() != trimmed.len() {
            if let (Some(section), Some(option)) = (&section, &last_option) {
                let values = config.ensure_section(section.clone());
                if let Some(value) = values.get_mut(option) {
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(trimmed);
                }
                continue;
            }
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            let name = rest
                .strip_suffix(']')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| LoadError::Ini {
                    line: line_no,
                    message: format!("malformed section header '{trimmed}'"),
                })?;
            config.ensure_section(name);
            section = Some(name.to_string());
            last_option = None;
            continue;
        }

        let Some(current) = &section else {
            return Err(LoadError::Ini {
                line: line_no,
                message: "option defined before any [section] header".to_string(),
            });
        };

        let (key, value) = match trimmed.find(['=', ':']) {
            Some(pos) => (trimmed[..pos].trim(), trimmed[pos + 1..].trim()),
            None => (trimmed, ""),
        };
        if key.is_empty() {
            return Err(LoadError::Ini {
                line: line_no,
                message: "empty option name".to_string(),
            });
        }

        config.insert(current.clone(), key, value);
        last_option = Some(key.to_string());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.yaml")), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_path(Path::new("a.YML")), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_path(Path::new("a.conf")), Some(ConfigFormat::Ini));
        assert_eq!(ConfigFormat::from_path(Path::new("a.ini")), Some(ConfigFormat::Ini));
        assert_eq!(ConfigFormat::from_path(Path::new("a.cfg")), Some(ConfigFormat::Ini));
        assert_eq!(ConfigFormat::from_path(Path::new("a.txt")), None);
        assert_eq!(ConfigFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn parse_basic_ini() {
        let ini = "[section]\noption1 = value1\noption2: value2\n\n[other]\nflag\n";

        let config = parse_ini(ini).unwrap();
        assert_eq!(config.get("section", "option1"), Some("value1"));
        assert_eq!(config.get("section", "option2"), Some("value2"));
        assert_eq!(config.get("other", "flag"), Some(""));
    }

    #[test]
    fn ini_empty_value() {
        let config = parse_ini("[section]\noption1 =\n").unwrap();
        assert_eq!(config.get("section", "option1"), Some(""));
    }

    #[test]
    fn ini_value_keeps_later_separators() {
        let config = parse_ini("[db]\nurl = postgres://host:5432/db?a=b\n").unwrap();
        assert_eq!(config.get("db", "url"), Some("postgres://host:5432/db?a=b"));
    }

    #[test]
    fn ini_comments_and_continuations() {
        let ini = "# header comment\n[section]\n; note\nhosts = a\n  b\n  c\nnext = 1\n";

        let config = parse_ini(ini).unwrap();
        assert_eq!(config.get("section", "hosts"), Some("a\nb\nc"));
        assert_eq!(config.get("section", "next"), Some("1"));
    }

    #[test]
    fn ini_empty_section() {
        let config = parse_ini("[empty]\n").unwrap();
        assert!(config.section("empty").unwrap().is_empty());
    }

    #[test]
    fn ini_option_before_section() {
        let err = parse_ini("option = value\n").unwrap_err();
        assert!(matches!(err, LoadError::Ini { line: 1, .. }));
    }

    #[test]
    fn ini_malformed_header() {
        let err = parse_ini("[section\n").unwrap_err();
        assert!(matches!(err, LoadError::Ini { line: 1, .. }));
    }

    #[test]
    fn parse_yaml_config() {
        let yaml = r#"
            section:
              port: 8080
              debug: true
              name: app
              hosts: [a, b]
              empty:
            bare:
        "#;

        let config = parse_yaml(yaml).unwrap();
        assert_eq!(config.get("section", "port"), Some("8080"));
        assert_eq!(config.get("section", "debug"), Some("true"));
        assert_eq!(config.get("section", "name"), Some("app"));
        assert_eq!(config.get("section", "hosts"), Some("a, b"));
        assert_eq!(config.get("section", "empty"), Some(""));
        assert!(config.contains_section("bare"));
    }

    #[test]
    fn yaml_must_be_two_levels() {
        let err = parse_yaml("section: option=value\n").unwrap_err();
        assert!(matches!(err, LoadError::Structure(_)));

        let err = parse_yaml("section:\n  nested:\n    deep: 1\n").unwrap_err();
        assert!(matches!(err, LoadError::Structure(_)));
    }

    #[test]
    fn invalid_yaml() {
        let err = parse_config("[[[section]]]\n  option=value\n", Some(ConfigFormat::Yaml)).unwrap_err();
        assert!(matches!(err, LoadError::Yaml(_)));
    }

    #[test]
    fn sniffs_ini_when_yaml_fails() {
        let config = parse_config("[section]\noption = value\n", None).unwrap();
        assert_eq!(config.get("section", "option"), Some("value"));
    }

    #[test]
    fn sniffs_yaml_first() {
        let config = parse_config("section:\n  option: value\n", None).unwrap();
        assert_eq!(config.get("section", "option"), Some("value"));
    }

    #[test]
    fn neither_format() {
        let err = parse_config("just = text\n", None).unwrap_err();
        assert!(matches!(err, LoadError::UnknownFormat { .. }));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".conf").tempfile().unwrap();
        writeln!(file, "[section]\noption = value").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.get("section", "option"), Some("value"));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
