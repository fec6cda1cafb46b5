//! Validate command implementation.

use colored::Colorize;
use confirm_core::{Category, Finding, Report, Settings, Severity, Validator};
use std::path::Path;
use std::process::ExitCode;

/// Output switches for `confirm validate`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flags {
    pub typos: bool,
    pub warnings: bool,
    pub infos: bool,
    pub deprecation: bool,
    pub json: bool,
}

impl Flags {
    /// Turn on anything the user settings enable.
    fn with_settings(mut self, settings: &Settings) -> Self {
        self.warnings |= settings.validate.warnings;
        self.infos |= settings.validate.infos;
        self.deprecation |= settings.validate.deprecation;
        self
    }

    fn shows(&self, finding: &Finding) -> bool {
        match finding.severity {
            Severity::Error => true,
            Severity::Warning => {
                self.warnings || (self.typos && finding.category == Category::Typo)
            }
            Severity::Info => self.infos,
        }
    }
}

pub fn run(schema_path: &Path, config_path: &Path, flags: Flags) -> ExitCode {
    run_with(schema_path, config_path, flags, &Settings::load())
}

fn run_with(schema_path: &Path, config_path: &Path, flags: Flags, settings: &Settings) -> ExitCode {
    let flags = flags.with_settings(settings);

    let Some(schema) = super::load_schema(schema_path) else {
        return ExitCode::FAILURE;
    };
    let Some(config) = super::load_config(config_path) else {
        return ExitCode::FAILURE;
    };

    let report = Validator::new(&schema, &config)
        .error_on_deprecated(flags.deprecation)
        .typo_ratio(settings.validate.typo_ratio)
        .validate();

    if flags.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize findings: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        for line in render(&report, &flags) {
            println!("{line}");
        }
    }

    if report.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Render the findings the flags ask for: errors, then warnings, then infos.
fn render(report: &Report, flags: &Flags) -> Vec<String> {
    let mut lines = Vec::new();
    for severity in [Severity::Error, Severity::Warning, Severity::Info] {
        for finding in report.by_severity(severity).filter(|f| flags.shows(f)) {
            let label = match severity {
                Severity::Error => "Error   :".red(),
                Severity::Warning => "Warning :".yellow(),
                Severity::Info => "Info    :".normal(),
            };
            lines.push(format!("{label} {finding}"));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use confirm_core::{parse_ini, validate, Schema};

    fn report() -> Report {
        let schema = Schema::from_str(
            "s:\n  req: {required: true}\n  option1: {}\n  port: {default: 80}\nt:\n  old: {deprecated: true}\n  new: {}\n",
        )
        .unwrap();
        let config = parse_ini("[s]\noption13 = 1\n[t]\nold = x\n").unwrap();
        validate(&config, &schema, false)
    }

    fn render_plain(report: &Report, flags: &Flags) -> Vec<String> {
        colored::control::set_override(false);
        render(report, flags)
    }

    #[test]
    fn errors_only_by_default() {
        let lines = render_plain(&report(), &Flags::default());
        assert_eq!(lines, vec!["Error   : Missing required option req in section s."]);
    }

    #[test]
    fn typos_flag_shows_typo_warnings_only() {
        let flags = Flags {
            typos: true,
            ..Flags::default()
        };
        let lines = render_plain(&report(), &flags);
        assert!(lines.contains(&"Warning : Possible typo for option option1 : option13.".to_string()));
        assert!(!lines.iter().any(|l| l.contains("deprecated")));
    }

    #[test]
    fn warnings_and_infos() {
        let flags = Flags {
            warnings: true,
            infos: true,
            ..Flags::default()
        };
        let lines = render_plain(&report(), &flags);
        assert!(lines.contains(&"Warning : Option old of section t is deprecated.".to_string()));
        assert!(lines.contains(
            &"Info    : Option port of section s is not set, default value 80 will be used.".to_string()
        ));
        assert!(lines[0].starts_with("Error"));
        assert!(lines.last().unwrap().starts_with("Info"));
    }

    #[test]
    fn settings_enable_flags() {
        let mut settings = Settings::default();
        settings.validate.warnings = true;
        settings.validate.deprecation = true;

        let flags = Flags::default().with_settings(&settings);
        assert!(flags.warnings);
        assert!(flags.deprecation);
        assert!(!flags.infos);
    }

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn exit_code_follows_errors() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(&dir, "schema.yaml", "s:\n  req: {required: true, type: int}\n");
        let good = write(&dir, "good.ini", "[s]\nreq = 1\n");
        let bad = write(&dir, "bad.ini", "[s]\nreq = x\n");
        let settings = Settings::default();

        assert_eq!(run_with(&schema, &good, Flags::default(), &settings), ExitCode::SUCCESS);
        assert_eq!(run_with(&schema, &bad, Flags::default(), &settings), ExitCode::FAILURE);
    }

    #[test]
    fn warnings_alone_do_not_fail() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(&dir, "schema.yaml", "s:\n  a: {}\n");
        let config = write(&dir, "config.yaml", "s:\n  a: 1\nextra:\n  b: 2\n");
        let flags = Flags {
            warnings: true,
            json: true,
            ..Flags::default()
        };

        assert_eq!(run_with(&schema, &config, flags, &Settings::default()), ExitCode::SUCCESS);
    }

    #[test]
    fn load_failures_fail() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(&dir, "schema.yaml", "s:\n  a: {}\n");
        let config = write(&dir, "config.ini", "[s]\na = 1\n");
        let missing = dir.path().join("missing.yaml");
        let broken = write(&dir, "broken.yaml", "- not\n- a mapping\n");
        let settings = Settings::default();

        assert_eq!(run_with(&missing, &config, Flags::default(), &settings), ExitCode::FAILURE);
        assert_eq!(run_with(&schema, &missing, Flags::default(), &settings), ExitCode::FAILURE);
        assert_eq!(run_with(&broken, &config, Flags::default(), &settings), ExitCode::FAILURE);
    }
}
