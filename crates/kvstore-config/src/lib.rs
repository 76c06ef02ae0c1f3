//! Configuration support: the [`Config`] trait and the [`ConfigManager`]
//! holding the live value.

mod manager;

pub use manager::ConfigManager;

use serde::de::DeserializeOwned;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The TOML does not match the configuration schema.
    #[error("config schema error: {0}")]
    Deserialize(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A configuration type loadable from TOML.
pub trait Config: DeserializeOwned + Send + Sync + 'static {
    fn from_toml(value: &toml::Value) -> Result<Self, ConfigError> {
        value
            .clone()
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Deserialize(e.message().to_string()))
    }

    /// Reject semantically invalid settings.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}
