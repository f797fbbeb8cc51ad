//! Command implementations.

mod dispatch;
mod info;
mod validate;

pub use dispatch::run_dispatch;
pub use info::run_info;
pub use validate::run_validate;

use std::path::Path;

use contracts::ActionsManifest;

use crate::error::{CliError, Result};

/// Load the actions file, failing when it does not exist
fn load_manifest(path: &Path) -> Result<ActionsManifest> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }
    config_loader::ConfigLoader::load_from_path(path)
        .map_err(|e| CliError::config_load(path.display().to_string(), e))
}
