//! # Config Loader
//!
//! Rig configuration loading.
//!
//! Responsibilities:
//! - Parse TOML/JSON rig descriptions
//! - Validate field ranges and cross-references
//! - Produce a `RigBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("rig.toml")).unwrap();
//! println!("devices: {}", blueprint.devices.len());
//! ```

mod parser;
mod validator;

pub use contracts::RigBlueprint;
pub use parser::ConfigFormat;

use contracts::ConfigError;
use std::path::Path;

/// Built-in rig shipped with the binary
const BUILTIN_RIG: &str = include_str!("../../../configs/default_rig.toml");

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
    pub fn load_from_path(path: &Path) -> Result<RigBlueprint, ConfigError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<RigBlueprint, ConfigError> {
        Self::parse_and_validate(content, format)
    }

    /// The built-in simulated rig (one depth camera: stereo, RGB and motion sensors)
    pub fn builtin() -> Result<RigBlueprint, ConfigError> {
        Self::load_from_str(BUILTIN_RIG, ConfigFormat::Toml)
    }

    /// Serialize RigBlueprint to TOML string
    pub fn to_toml(blueprint: &RigBlueprint) -> Result<String, ConfigError> {
        toml::to_string_pretty(blueprint).map_err(|e| ConfigError::Parse {
            message: format!("TOML serialize error: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Serialize RigBlueprint to JSON string
    pub fn to_json(blueprint: &RigBlueprint) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(blueprint).map_err(|e| ConfigError::Parse {
            message: format!("JSON serialize error: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Run validation rules on an already constructed blueprint
    pub fn validate(blueprint: &RigBlueprint) -> Result<(), ConfigError> {
        validator::validate(blueprint)
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::parse("cannot determine file format from extension"))?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::parse(format!("unsupported config format: .{ext}")))
    }

    fn read_file(path: &Path) -> Result<String, ConfigError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn parse_and_validate(content: &str, format: ConfigFormat) -> Result<RigBlueprint, ConfigError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}
