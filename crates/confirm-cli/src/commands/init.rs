//! Init command implementation.

use confirm_core::reverse_engineer_schema;
use std::path::Path;
use std::process::ExitCode;

pub fn run(config_path: &Path) -> ExitCode {
    let Some(config) = super::load_config(config_path) else {
        return ExitCode::FAILURE;
    };

    match reverse_engineer_schema(&config).to_yaml() {
        Ok(yaml) => {
            print!("{yaml}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
