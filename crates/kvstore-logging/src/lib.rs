//! `tracing` subscriber setup shared by the kvstore binaries.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::Subscriber;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

pub use tracing_appender::non_blocking::WorkerGuard;
pub use tracing_appender::rolling::InitError;

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// How often the log file is rolled over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollEvery {
    Hour,
    #[default]
    Day,
    Never,
}

impl From<RollEvery> for Rotation {
    fn from(every: RollEvery) -> Self {
        match every {
            RollEvery::Hour => Rotation::HOURLY,
            RollEvery::Day => Rotation::DAILY,
            RollEvery::Never => Rotation::NEVER,
        }
    }
}

/// `[log]` section of the store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `kvstore_bucket=debug`.
    pub level: String,
    /// Write rolling log files here in addition to (or instead of) stderr.
    pub dir: Option<PathBuf>,
    pub file_prefix: String,
    pub roll: RollEvery,
    pub json: bool,
    pub stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            file_prefix: "kvstore".to_string(),
            roll: RollEvery::Day,
            json: false,
            stderr: true,
        }
    }
}

impl LogConfig {
    /// Same config with the level replaced, e.g. for a `--verbose` flag.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

fn fmt_layer<S, W>(writer: W, json: bool, ansi: bool) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_ansi(ansi).with_writer(writer);
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

/// Install the global subscriber. Call once at startup.
///
/// `RUST_LOG` takes precedence over `config.level`. When `config.dir` is set
/// the returned guard flushes the file writer on drop and must outlive all
/// logging.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, InitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let stderr = config
        .stderr
        .then(|| fmt_layer(std::io::stderr, config.json, true));

    let (file, guard) = match &config.dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(config.roll.into())
                .filename_prefix(&config.file_prefix)
                .filename_suffix("log")
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt_layer(writer, config.json, false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .init();
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logs_to_stderr_only() {
        let cfg = LogConfig::default();
        assert_eq!(cfg.level, "info");
        assert!(cfg.stderr);
        assert!(cfg.dir.is_none());
        assert_eq!(Rotation::from(cfg.roll), Rotation::DAILY);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let cfg: LogConfig = toml::from_str("level = \"warn\"\nroll = \"hour\"\ndir = \"/var/log/kv\"").unwrap();
        assert_eq!(cfg.level, "warn");
        assert_eq!(cfg.roll, RollEvery::Hour);
        assert_eq!(cfg.dir, Some(PathBuf::from("/var/log/kv")));
        assert_eq!(cfg.file_prefix, "kvstore");
        assert!(!cfg.json);
    }

    #[test]
    fn test_unknown_roll_is_rejected() {
        assert!(toml::from_str::<LogConfig>("roll = \"weekly\"").is_err());
    }

    #[test]
    fn test_verbose_override() {
        let cfg = LogConfig::default().with_level("debug");
        assert_eq!(cfg.level, "debug");
        assert_eq!(cfg.roll, RollEvery::Day);
    }
}
