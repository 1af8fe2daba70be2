//! File logging for kairo processes.
//!
//! # Responsibility
//! - Start the rolling file logger once per process.
//! - Emit metadata-only events (ids and counts, never task titles or
//!   descriptions).
//!
//! # Invariants
//! - Starting twice with the same configuration is a no-op.
//! - Starting with a different level or directory is rejected.
//! - Panic payloads are never written to the log; only their location is.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, LogSpecification, Logger, LoggerHandle,
    Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "kairo";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    config: LoggingConfig,
    _handle: LoggerHandle,
}

/// Verbosity accepted by `--log-level` / `KAIRO_LOG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Off => "off",
        }
    }

    fn filter(&self) -> LevelFilter {
        match self {
            Self::Trace => LevelFilter::Trace,
            Self::Debug => LevelFilter::Debug,
            Self::Info => LevelFilter::Info,
            Self::Warn => LevelFilter::Warn,
            Self::Error => LevelFilter::Error,
            Self::Off => LevelFilter::Off,
        }
    }
}

impl FromStr for LogLevel {
    type Err = LoggingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "off" => Ok(Self::Off),
            _ => Err(LoggingError::UnknownLevel(value.trim().to_string())),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from logging setup.
#[derive(Debug)]
pub enum LoggingError {
    UnknownLevel(String),
    /// Log directory is empty or relative.
    RelativeDir(PathBuf),
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    Backend(FlexiLoggerError),
    /// Logging already runs with another configuration.
    Conflict {
        active: LoggingConfig,
        requested: LoggingConfig,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(value) => write!(
                f,
                "unknown log level `{value}`; expected trace|debug|info|warn|error|off"
            ),
            Self::RelativeDir(path) => {
                write!(f, "log directory must be absolute, got `{}`", path.display())
            }
            Self::CreateDir { path, source } => write!(
                f,
                "cannot create log directory `{}`: {source}",
                path.display()
            ),
            Self::Backend(err) => write!(f, "cannot start file logger: {err}"),
            Self::Conflict { active, requested } => write!(
                f,
                "logging already runs at {} in `{}`; cannot switch to {} in `{}`",
                active.level,
                active.log_dir.display(),
                requested.level,
                requested.log_dir.display()
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            Self::UnknownLevel(_) | Self::RelativeDir(_) | Self::Conflict { .. } => None,
        }
    }
}

impl From<FlexiLoggerError> for LoggingError {
    fn from(value: FlexiLoggerError) -> Self {
        Self::Backend(value)
    }
}

/// Validated logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    level: LogLevel,
    log_dir: PathBuf,
}

impl LoggingConfig {
    /// Parses `level` and checks that `log_dir` is absolute.
    pub fn new(level: &str, log_dir: impl AsRef<Path>) -> Result<Self, LoggingError> {
        let log_dir = log_dir.as_ref();
        if !log_dir.is_absolute() {
            return Err(LoggingError::RelativeDir(log_dir.to_path_buf()));
        }
        Ok(Self {
            level: level.parse()?,
            log_dir: log_dir.to_path_buf(),
        })
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Starts the file logger and the panic hook.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let active = ACTIVE.get_or_try_init(|| start(config))?;
    if &active.config != config {
        return Err(LoggingError::Conflict {
            active: active.config.clone(),
            requested: config.clone(),
        });
    }
    Ok(())
}

/// Returns the active configuration, or `None` before `init_logging`.
pub fn logging_status() -> Option<LoggingConfig> {
    ACTIVE.get().map(|active| active.config.clone())
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> LogLevel {
    if cfg!(debug_assertions) {
        LogLevel::Debug
    } else {
        LogLevel::Info
    }
}

fn start(config: &LoggingConfig) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&config.log_dir).map_err(|source| LoggingError::CreateDir {
        path: config.log_dir.clone(),
        source,
    })?;

    let spec = LogSpecification::builder()
        .default(config.level.filter())
        .build();
    let handle = Logger::with(spec)
        .log_to_file(
            FileSpec::default()
                .directory(config.log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!("event=panic module=core status=error location={location}");
        previous_hook(panic_info);
    }));

    info!(
        "event=logging_init module=core status=ok version={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        config.level,
        config.log_dir.display()
    );

    Ok(ActiveLogger {
        config: config.clone(),
        _handle: handle,
    })
}
