//! Tracing setup for the binary.
//!
//! Three layers on one registry:
//!
//! - console (stderr): `RUST_LOG` filter, `info` when unset;
//! - `<command>.<YYYY-MM-DD>.log`: DEBUG and above, rotated daily;
//! - `error.<YYYY-MM-DD>.log`: ERROR only, rotated daily with a longer
//!   retention.
//!
//! Dates are UTC, as the rolling appender names its files.
//!
//! The returned guards flush the file writers when dropped, so `main` keeps
//! them alive until exit.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use promptforge_config::LoggingSettings;
use promptforge_contracts::error::{ForgeError, ForgeResult};

pub const ERROR_LOG: &str = "error";

const LOG_SUFFIX: &str = "log";

/// Keeps the non-blocking file writers flushing until dropped.
#[must_use = "dropping the guards stops file logging"]
pub struct LogGuards {
    _command: WorkerGuard,
    _errors: WorkerGuard,
}

fn rolling(dir: &Path, prefix: &str, max_files: usize) -> ForgeResult<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix(LOG_SUFFIX)
        .max_log_files(max_files)
        .build(dir)
        .map_err(|e| ForgeError::Config {
            reason: format!("failed to open {prefix} log in '{}': {e}", dir.display()),
        })
}

/// The file a daily appender with `prefix` writes to on `date`.
fn daily_log_path(dir: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    dir.join(format!("{prefix}.{}.{LOG_SUFFIX}", date.format("%Y-%m-%d")))
}

/// Today's error log file.
pub fn current_error_log(dir: &Path) -> PathBuf {
    daily_log_path(dir, ERROR_LOG, Utc::now().date_naive())
}

/// Install the global subscriber for `command` (e.g. `charactergen`).
pub fn init(command: &str, settings: &LoggingSettings) -> ForgeResult<LogGuards> {
    std::fs::create_dir_all(&settings.dir).map_err(|e| ForgeError::Config {
        reason: format!(
            "failed to create log directory '{}': {e}",
            settings.dir.display()
        ),
    })?;

    let (command_writer, command_guard) =
        tracing_appender::non_blocking(rolling(&settings.dir, command, settings.retention_days)?);
    let (error_writer, error_guard) = tracing_appender::non_blocking(rolling(
        &settings.dir,
        ERROR_LOG,
        settings.error_retention_days,
    )?);

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let command_file = fmt::layer()
        .with_writer(command_writer)
        .with_ansi(false)
        .with_filter(LevelFilter::DEBUG);

    let error_file = fmt::layer()
        .with_writer(error_writer)
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    tracing_subscriber::registry()
        .with(console)
        .with(command_file)
        .with(error_file)
        .try_init()
        .map_err(|e| ForgeError::Config {
            reason: format!("failed to install tracing subscriber: {e}"),
        })?;

    Ok(LogGuards {
        _command: command_guard,
        _errors: error_guard,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
