//! Global options selecting and configuring the store a command runs against.

use std::path::PathBuf;

use anyhow::Context;
use kvstore_bucket::{BackendKind, StoreConfig};
use kvstore_config::ConfigManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendArg {
    Memory,
    Sled,
    SledNative,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Memory => BackendKind::Memory,
            BackendArg::Sled => BackendKind::Sled,
            BackendArg::SledNative => BackendKind::SledNative,
        }
    }
}

/// Store selection flags shared by every subcommand.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StoreOptions {
    /// Path to a TOML store configuration file.
    #[arg(long, env = "KVSTORE_CONFIG")]
    pub config: Option<String>,

    /// Override the configured backend.
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Override the configured database path.
    #[arg(long)]
    pub path: Option<PathBuf>,
}

impl StoreOptions {
    /// Config path with a leading `~/` expanded to `$HOME`.
    pub fn resolved_config_path(&self) -> Option<PathBuf> {
        let path = self.config.as_deref()?;
        if let Some(rest) = path.strip_prefix("~/") {
            if let Ok(home) = std::env::var("HOME") {
                return Some(PathBuf::from(home).join(rest));
            }
        }
        Some(PathBuf::from(path))
    }

    /// Load the configuration file (or defaults) and apply the command-line
    /// overrides. The result is validated.
    pub fn load(&self) -> anyhow::Result<ConfigManager<StoreConfig>> {
        let manager = match self.resolved_config_path() {
            Some(path) => ConfigManager::<StoreConfig>::load(&path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ConfigManager::new(StoreConfig::default()),
        };

        if self.backend.is_some() || self.path.is_some() {
            let mut config = manager.snapshot();
            if let Some(backend) = self.backend {
                config.backend = backend.into();
            }
            if let Some(path) = &self.path {
                config.path = path.clone();
            }
            manager
                .update(config)
                .context("applying command-line overrides")?;
        }

        Ok(manager)
    }
}
