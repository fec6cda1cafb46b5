//! Document command implementation.

use confirm_core::build_documentation;
use std::path::Path;
use std::process::ExitCode;

pub fn run(schema_path: &Path) -> ExitCode {
    let Some(schema) = super::load_schema(schema_path) else {
        return ExitCode::FAILURE;
    };

    print!("{}", build_documentation(&schema));
    ExitCode::SUCCESS
}
