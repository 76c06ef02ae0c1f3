use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use kvstore_config::{Config, ConfigError};
use kvstore_logging::LogConfig;

use crate::codec::{
    KeyCodec, LengthPrefixedCodec, SeparatorCodec, DEFAULT_COUNT_SUFFIX, DEFAULT_SEQUENCE_SUFFIX,
};

/// Which engine backs the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Flat in-memory engine; nothing survives `close`.
    Memory,
    /// Flat sled database with composite keys.
    #[default]
    Sled,
    /// sled with one tree per bucket.
    SledNative,
}

impl BackendKind {
    pub fn is_persistent(self) -> bool {
        !matches!(self, BackendKind::Memory)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Sled => "sled",
            BackendKind::SledNative => "sled-native",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyEncoding {
    #[default]
    LengthPrefixed,
    Separator,
}

/// Composite key layout for flat backends. Ignored by `sled-native`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    #[serde(default)]
    pub encoding: KeyEncoding,

    /// Single-byte separator for the `separator` encoding.
    #[serde(default = "default_separator")]
    pub separator: String,

    #[serde(default = "default_count_suffix")]
    pub count_suffix: String,

    #[serde(default = "default_sequence_suffix")]
    pub sequence_suffix: String,
}

fn default_separator() -> String {
    "_".into()
}

fn default_count_suffix() -> String {
    DEFAULT_COUNT_SUFFIX.into()
}

fn default_sequence_suffix() -> String {
    DEFAULT_SEQUENCE_SUFFIX.into()
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            encoding: KeyEncoding::default(),
            separator: default_separator(),
            count_suffix: default_count_suffix(),
            sequence_suffix: default_sequence_suffix(),
        }
    }
}

impl CodecConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.encoding != KeyEncoding::Separator {
            return Ok(());
        }
        if self.separator.len() != 1 {
            return Err(ConfigError::Invalid(format!(
                "codec.separator must be exactly one byte, got {:?}",
                self.separator
            )));
        }
        if self.count_suffix.is_empty() || self.sequence_suffix.is_empty() {
            return Err(ConfigError::Invalid(
                "codec suffixes must not be empty".into(),
            ));
        }
        let (count, sequence) = (self.count_suffix.as_bytes(), self.sequence_suffix.as_bytes());
        if count.ends_with(sequence) || sequence.ends_with(count) {
            return Err(ConfigError::Invalid(
                "codec.count_suffix and codec.sequence_suffix must differ, and neither may end with the other".into(),
            ));
        }
        // A record key is `bucket || suffix` and bucket names never contain
        // the separator, so a suffix holding the separator past its first
        // byte would read as an entry of some other bucket.
        let sep = self.separator.as_bytes()[0];
        for suffix in [count, sequence] {
            if suffix[0] != sep && suffix.contains(&sep) {
                return Err(ConfigError::Invalid(format!(
                    "codec suffix {:?} must start with the separator or not contain it",
                    String::from_utf8_lossy(suffix)
                )));
            }
        }
        Ok(())
    }

    pub fn build(&self) -> Box<dyn KeyCodec> {
        match self.encoding {
            KeyEncoding::LengthPrefixed => Box::new(LengthPrefixedCodec),
            KeyEncoding::Separator => Box::new(SeparatorCodec::new(
                self.separator.as_bytes().first().copied().unwrap_or(b'_'),
                self.count_suffix.as_bytes(),
                self.sequence_suffix.as_bytes(),
            )),
        }
    }
}

/// Top-level store configuration, loaded from TOML.
///
/// ```toml
/// backend = "sled"
/// path = "/var/lib/kvstore"
///
/// [codec]
/// encoding = "length-prefixed"
///
/// [log]
/// level = "info"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Database location. Ignored by the memory backend.
    #[serde(default = "default_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub codec: CodecConfig,

    #[serde(default)]
    pub log: LogConfig,
}

fn default_path() -> PathBuf {
    PathBuf::from("kvstore.db")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            path: default_path(),
            codec: CodecConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config for StoreConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.is_persistent() && self.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "path is required for the {} backend",
                self.backend.as_str()
            )));
        }
        self.codec.validate()
    }
}
