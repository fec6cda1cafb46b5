pub mod document;
pub mod generate;
pub mod init;
pub mod migrate;
pub mod validate;

use confirm_core::Schema;
use std::path::Path;

/// Load a schema, printing the error on failure.
pub fn load_schema(path: &Path) -> Option<Schema> {
    tracing::debug!(path = %path.display(), "loading schema");
    match Schema::from_path(path) {
        Ok(schema) => Some(schema),
        Err(e) => {
            eprintln!("error: {}: {e}", path.display());
            None
        }
    }
}

/// Load a config file, printing the error on failure.
pub fn load_config(path: &Path) -> Option<confirm_core::Config> {
    match confirm_core::load_config(path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("error: {e}");
            None
        }
    }
}
