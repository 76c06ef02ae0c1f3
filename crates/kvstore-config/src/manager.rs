use std::path::Path;
use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};

use crate::{Config, ConfigError};

/// Holds the live configuration. Readers take lock-free snapshots while an
/// override swaps in a new value.
pub struct ConfigManager<T: Config> {
    current: ArcSwap<T>,
}

impl<T: Config> ConfigManager<T> {
    /// Manager over an in-memory value.
    pub fn new(config: T) -> Self {
        Self {
            current: ArcSwap::new(Arc::new(config)),
        }
    }

    /// Read, parse and validate the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = T::from_toml(&text.parse::<toml::Value>()?)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(Self::new(config))
    }

    pub fn get(&self) -> Guard<Arc<T>> {
        self.current.load()
    }

    /// Replace the whole configuration. Nothing changes if `config` is invalid.
    pub fn update(&self, config: T) -> Result<(), ConfigError> {
        config.validate()?;
        self.current.store(Arc::new(config));
        Ok(())
    }
}

impl<T: Config + Clone> ConfigManager<T> {
    pub fn snapshot(&self) -> T {
        T::clone(&self.current.load())
    }
}
