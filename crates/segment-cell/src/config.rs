//! Cell configuration.
//!
//! One [`CellConfig`] is built by the host and shared (via `Arc`) by every cell it creates.
//!
//! ```yaml
//! validation: sequence
//! styles:
//!   highlight:
//!     parent: regular
//!     background: orange
//! ```

use segment_core::{ConfigError, StyleSheet, ValidationPolicy};
use serde::Deserialize;

/// Immutable settings shared by the cells of one table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellConfig {
    /// Rendering directives for each style name.
    #[serde(default)]
    pub styles: StyleSheet,
    /// How an edited variant's tags are compared with its pre-edit snapshot.
    #[serde(default)]
    pub validation: ValidationPolicy,
}

impl CellConfig {
    /// Parse a configuration from YAML. Missing sections keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Replace the validation policy.
    pub fn with_validation(mut self, validation: ValidationPolicy) -> Self {
        self.validation = validation;
        self
    }
}
