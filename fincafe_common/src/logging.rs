//! Logging setup shared by the FinCafe crates
//!
//! Binaries call one of the `init_*` functions once at startup. Subsequent calls are
//! no-ops, so tests and helper binaries can call them freely.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use once_cell::sync::Lazy;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::FincafeError;

/// Crates whose events are enabled at the configured level when `RUST_LOG` is unset.
const WORKSPACE_CRATES: [&str; 4] = [
    "fincafe_common",
    "fincafe_tenancy",
    "fincafe_api",
    "migration",
];

/// Configuration for logging setup
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_level: String,
    /// Name of the running binary, used for the log file name
    pub app_name: String,
}

impl LoggingConfig {
    pub fn new(level: &str, app_name: &str) -> Self {
        Self {
            log_level: level.to_string(),
            app_name: app_name.to_string(),
        }
    }
}

static CONSOLE_INIT: Once = Once::new();
static FILE_INIT: Once = Once::new();

// The non-blocking writer stops flushing once its guard is dropped.
static FILE_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// Initialize console logging with `RUST_LOG` support
pub fn init_console_logging(config: &LoggingConfig) {
    CONSOLE_INIT.call_once(|| {
        let result = tracing_subscriber::registry()
            .with(create_env_filter(config))
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init();

        match result {
            Ok(()) => debug!(
                "Console logging initialized for {} (level: {})",
                config.app_name, config.log_level
            ),
            // Another subscriber (e.g. a test harness) is already installed.
            Err(e) => eprintln!("[FINCAFE] console logging not installed: {e}"),
        }
    });
}

/// Initialize logging to a daily-rolling file in `log_dir`, mirrored to stdout
pub fn init_file_logging(config: &LoggingConfig, log_dir: &Path) -> Result<(), FincafeError> {
    let mut init_result = Ok(());

    FILE_INIT.call_once(|| {
        init_result = install_file_subscriber(config, log_dir);
    });

    init_result
}

fn install_file_subscriber(config: &LoggingConfig, log_dir: &Path) -> Result<(), FincafeError> {
    fs::create_dir_all(log_dir).map_err(|e| {
        FincafeError::ConfigError(format!(
            "cannot create log directory {}: {e}",
            log_dir.display()
        ))
    })?;

    let file_appender =
        tracing_appender::rolling::daily(log_dir, format!("{}.log", config.app_name));
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(create_env_filter(config))
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false),
        )
        .with(fmt::layer().with_target(true).with_ansi(true))
        .try_init()
        .map_err(|e| FincafeError::Internal(format!("cannot install subscriber: {e}")))?;

    if let Ok(mut guard) = FILE_GUARD.lock() {
        *guard = Some(file_guard);
    }

    info!(
        "File logging initialized for {} in {}",
        config.app_name,
        log_dir.display()
    );
    Ok(())
}

/// Build the filter: `RUST_LOG` wins, otherwise every workspace crate at the configured level
fn create_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(config)))
}

fn default_directives(config: &LoggingConfig) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        WORKSPACE_CRATES
            .iter()
            .map(|krate| format!("{krate}={}", config.log_level)),
    );
    directives.join(",")
}

/// Initialize logging from settings: file logging when a directory is configured
pub fn init_from_settings(level: &str, app_name: &str, log_dir: Option<&PathBuf>) {
    let config = LoggingConfig::new(level, app_name);
    match log_dir {
        Some(dir) => {
            if let Err(e) = init_file_logging(&config, dir) {
                eprintln!("[FINCAFE] falling back to console logging: {e}");
                init_console_logging(&config);
            }
        }
        None => init_console_logging(&config),
    }
}

// Logging macros
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        tracing::error!($($arg)*)
    };
}
