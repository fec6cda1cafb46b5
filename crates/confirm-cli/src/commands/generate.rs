//! Generate command implementation.

use confirm_core::build_config_skeleton;
use std::path::Path;
use std::process::ExitCode;

pub fn run(schema_path: &Path, include_all: bool) -> ExitCode {
    let Some(schema) = super::load_schema(schema_path) else {
        return ExitCode::FAILURE;
    };

    print!("{}", build_config_skeleton(&schema, include_all));
    ExitCode::SUCCESS
}
