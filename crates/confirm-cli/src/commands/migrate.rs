//! Migrate command implementation.

use confirm_core::{append_existing_values, build_config_skeleton};
use std::path::Path;
use std::process::ExitCode;

pub fn run(schema_path: &Path, config_path: &Path) -> ExitCode {
    let Some(schema) = super::load_schema(schema_path) else {
        return ExitCode::FAILURE;
    };
    let Some(config) = super::load_config(config_path) else {
        return ExitCode::FAILURE;
    };

    let merged = append_existing_values(&schema, &config);
    print!("{}", build_config_skeleton(&merged, false));
    ExitCode::SUCCESS
}
