//! Build configuration
//!
//! Tolerances and defaults passed explicitly into part construction. The
//! configuration can be stored in a RON file alongside a project.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CLEARANCE, DEFAULT_COLOR, DEFAULT_TOLERANCE};

/// How an assembly turns its children into one shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FinalizeMode {
    /// Keep every child as a distinct object under a named group
    #[default]
    Group,
    /// Boolean the children into a single solid
    Merge,
}

/// Settings shared by every part built in one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Epsilon for comparing lengths and dot products
    pub tolerance: f32,
    /// Clearance added to holes and slots (mm)
    pub clearance: f32,
    /// Validate user-supplied axis triples before building
    pub validate_axes: bool,
    /// Finalize mode used when a part does not choose one
    pub finalize_mode: FinalizeMode,
    /// Color given to new parts (RGBA)
    pub default_color: [f32; 4],
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            clearance: DEFAULT_CLEARANCE,
            validate_axes: true,
            finalize_mode: FinalizeMode::Group,
            default_color: DEFAULT_COLOR,
        }
    }
}

impl BuildConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if !self.clearance.is_finite() || self.clearance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "clearance must not be negative, got {}",
                self.clearance
            )));
        }
        if self.default_color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(ConfigError::Invalid(format!(
                "color components must be within 0..=1, got {:?}",
                self.default_color
            )));
        }
        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = self.to_ron_string()?;
        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Serialize to pretty RON
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Parse and validate RON text; missing fields take their defaults
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: BuildConfig =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.ron");

        let config = BuildConfig {
            clearance: 0.2,
            finalize_mode: FinalizeMode::Merge,
            ..BuildConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = BuildConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = BuildConfig::from_ron_str("(clearance: 0.1)").unwrap();
        assert_eq!(config.clearance, 0.1);
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
        assert!(config.validate_axes);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            BuildConfig::from_ron_str("(tolerance: -1.0)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            BuildConfig::from_ron_str("(tolerance: "),
            Err(ConfigError::Deserialize(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            BuildConfig::load("/nonexistent/dwh/build.ron"),
            Err(ConfigError::Io(_))
        ));
    }
}
