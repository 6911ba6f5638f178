//! Engine configuration.
//!
//! Loadable from TOML with the `toml` feature:
//!
//! ```toml
//! [engine]
//! dialect = "postgresql"
//! log_parameters = true
//! ```

use crate::dialect::Dialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub dialect: Dialect,
    /// Include bound values in trace output
    pub log_parameters: bool,
}

impl EngineConfig {
    pub const fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            log_parameters: false,
        }
    }

    pub const fn with_log_parameters(self, log_parameters: bool) -> Self {
        Self {
            log_parameters,
            ..self
        }
    }
}

/// Errors that can occur while loading configuration
#[cfg(feature = "toml")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[cfg(feature = "toml")]
#[derive(serde::Deserialize)]
struct ConfigFile {
    #[serde(default)]
    engine: EngineConfig,
}

#[cfg(feature = "toml")]
impl EngineConfig {
    /// Parses the `[engine]` table of a TOML document; a missing table yields defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.engine)
    }
}
