//! Tracing setup for the binary
//!
//! Filter precedence: `NIXLAYER_LOG` (any `EnvFilter` directive), then the
//! `-v` count, then the settings' log level, then `warn`. Events go to
//! stderr and, when the log directory is writable, to `logs/nixlayer.log`.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::domain::entities::LogLevel;

/// Environment variable holding an explicit filter directive.
pub const LOG_ENV: &str = "NIXLAYER_LOG";

/// File name of the persistent log inside the log directory.
pub const LOG_FILE: &str = "nixlayer.log";

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Number of `-v` flags.
    pub verbosity: u8,
    /// Level from the settings file.
    pub level: Option<LogLevel>,
    /// Directory for the persistent log file.
    pub log_dir: Option<PathBuf>,
}

/// Install the global subscriber. Returns the log file in use, if any.
///
/// Never fails: a missing log directory only disables the file layer, and a
/// second call is ignored.
pub fn init(options: &LogOptions) -> Option<PathBuf> {
    let directive = filter_directive(options, std::env::var(LOG_ENV).ok().as_deref());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let (file_layer, log_path) = match options.log_dir.as_deref().and_then(open_log_file) {
        Some((file, path)) => (
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_level(true),
            ),
            Some(path),
        ),
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    log_path
}

/// The directive the filter is built from.
pub fn filter_directive(options: &LogOptions, env: Option<&str>) -> String {
    if let Some(directive) = env.map(str::trim).filter(|d| !d.is_empty()) {
        return directive.to_string();
    }
    let level = match options.verbosity {
        0 => options.level.map(LogLevel::as_filter).unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    level.to_string()
}

fn open_log_file(dir: &Path) -> Option<(fs::File, PathBuf)> {
    fs::create_dir_all(dir).ok()?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;
    Some((file, path))
}
