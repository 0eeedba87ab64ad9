//! Logging setup.
//!
//! Events go to a daily rolling file and, in debug builds, to stderr. `RUST_LOG` sets the filter
//! (default `info`). `SANDBOX_LOG_DIR` moves the log files; setting it to an empty string turns
//! file logging off.

use std::{env, path::PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_DIR_VAR: &str = "SANDBOX_LOG_DIR";
const DEFAULT_LOG_DIR: &str = "logs";
const LOG_FILE_PREFIX: &str = "sandbox.log";

/// Keeps the background log writer alive. Dropping it flushes pending log lines.
#[derive(Debug)]
#[must_use]
pub(crate) struct TraceGuard {
    _file_log_guard: Option<WorkerGuard>,
}

pub(crate) fn initialize() -> TraceGuard {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let (file_layer, _file_log_guard) = match log_dir(|key| env::var(key).ok()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::Layer::new()
                .compact()
                .with_ansi(false)
                .with_line_number(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = cfg!(debug_assertions).then(|| {
        fmt::Layer::new()
            .compact()
            .without_time()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init();
    if let Err(err) = result {
        eprintln!("setting tracing default failed: {err}");
    }
    TraceGuard { _file_log_guard }
}

/// Directory for log files, or `None` when file logging is turned off.
fn log_dir(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    match lookup(LOG_DIR_VAR) {
        Some(dir) if dir.trim().is_empty() => None,
        Some(dir) => Some(PathBuf::from(dir)),
        None => Some(PathBuf::from(DEFAULT_LOG_DIR)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_dir_defaults_to_logs() {
        assert_eq!(log_dir(|_| None), Some(PathBuf::from("logs")));
    }

    #[test]
    fn log_dir_override() {
        let dir = log_dir(|key| (key == LOG_DIR_VAR).then(|| "/tmp/quads".to_owned()));
        assert_eq!(dir, Some(PathBuf::from("/tmp/quads")));
    }

    #[test]
    fn empty_log_dir_disables_file_logging() {
        assert_eq!(log_dir(|_| Some(String::new())), None);
        assert_eq!(log_dir(|_| Some("  ".to_owned())), None);
    }
}
