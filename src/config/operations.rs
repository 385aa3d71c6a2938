//! Settings loading and validation.

use super::model::Settings;
use crate::error::{GflowError, Result};
use crate::flow::BranchKind;
use std::path::Path;

/// Environment variable naming an alternative settings file.
pub const SETTINGS_PATH_ENV: &str = "GFLOW_CONFIG";

impl Settings {
    /// Load settings from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            GflowError::UserError(format!(
                "failed to read settings file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load settings from `path`, or the defaults when the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse settings from a YAML string. Unknown keys are ignored.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(yaml)
            .map_err(|e| GflowError::UserError(format!("failed to parse settings YAML: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validation rules:
    /// - `remote`, `default_production` and `default_development` must be non-empty
    /// - the default production and development branches must differ
    /// - every branch prefix must be non-empty
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("remote", &self.remote),
            ("default_production", &self.default_production),
            ("default_development", &self.default_development),
        ] {
            if value.trim().is_empty() {
                return Err(GflowError::UserError(format!(
                    "settings validation failed: {} must not be empty",
                    field
                )));
            }
        }

        if self.default_production == self.default_development {
            return Err(GflowError::UserError(format!(
                "settings validation failed: default_production and default_development \
                 are both '{}'",
                self.default_production
            )));
        }

        for kind in BranchKind::ALL {
            if self.prefixes.get(kind).trim().is_empty() {
                return Err(GflowError::UserError(format!(
                    "settings validation failed: prefixes.{} must not be empty",
                    kind
                )));
            }
        }

        Ok(())
    }
}
