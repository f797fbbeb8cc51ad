//! # Config Loader
//!
//! Action configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON action manifests
//! - Validate action names
//! - Generate `ActionsManifest`
//! - Derive the deployment namespace from an explicit variable map
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let manifest = ConfigLoader::load_from_path(Path::new("actions.toml")).unwrap();
//! println!("echo enabled: {}", manifest.is_enabled("echo"));
//! ```

mod namespace;
mod parser;
mod validator;

pub use contracts::ActionsManifest;
pub use namespace::{namespace, slugify, NamespaceVars};
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<ActionsManifest, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ActionsManifest, ContractError> {
        let manifest = parser::parse(content, format)?;
        validator::validate(&manifest)?;
        Ok(manifest)
    }

    /// Serialize ActionsManifest to TOML string
    pub fn to_toml(manifest: &ActionsManifest) -> Result<String, ContractError> {
        toml::to_string_pretty(manifest)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize ActionsManifest to JSON string
    pub fn to_json(manifest: &ActionsManifest) -> Result<String, ContractError> {
        serde_json::to_string_pretty(manifest)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }
}
