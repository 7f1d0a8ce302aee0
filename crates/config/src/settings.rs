//! Settings of the engine itself
//!
//! These govern how configuration files are written: whether the temp file
//! is synced to disk, which permissions it gets, and which product the
//! header comment names.

use crate::validation::{ValidationError, Validator};
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Mode applied to written files when the configured one cannot be parsed
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o600;

/// Engine-level settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Call fsync on the temp file before renaming it (slow)
    pub save_with_fsync: bool,

    /// Octal permissions applied to written files
    pub file_permissions: String,

    /// Product named in the header of written files
    pub product_name: String,

    /// Product version named in the header of written files
    pub product_version: String,

    /// Help link printed in the header of written files
    pub help_url: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            save_with_fsync: false,
            file_permissions: "600".to_string(),
            product_name: "WeeChat".to_string(),
            product_version: env!("CARGO_PKG_VERSION").to_string(),
            help_url: "https://weechat.org/doc/weechat/quickstart/".to_string(),
        }
    }
}

impl EngineSettings {
    /// Loads settings from a TOML file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let settings: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        if let Err(errors) = settings.validate() {
            let error_msg = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            log::warn!("Settings validation warnings: {}", error_msg);
        }

        Ok(settings)
    }

    /// Serializes settings to TOML
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validates the settings
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::octal_mode(&self.file_permissions, "settings.file_permissions"),
            Validator::not_empty(&self.product_name, "settings.product_name"),
        ])
    }

    /// Returns the file mode to apply, falling back to `0600`
    pub fn permissions_mode(&self) -> u32 {
        u32::from_str_radix(&self.file_permissions, 8).unwrap_or(DEFAULT_FILE_PERMISSIONS)
    }

    /// Returns the "name version" string printed in file headers
    pub fn product_label(&self) -> String {
        if self.product_version.is_empty() {
            self.product_name.clone()
        } else {
            format!("{} {}", self.product_name, self.product_version)
        }
    }
}
