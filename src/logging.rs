use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "recall-rival.log";

/// Keeps the non-blocking file writer flushing until dropped.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

#[derive(Debug, Clone)]
pub struct LogTargets {
    pub level: String,
    /// Directory for the daily-rolled log file, `None` for stdout only
    pub file_dir: Option<PathBuf>,
}

impl LogTargets {
    /// `ENABLE_FILE_LOGS=true|1` turns on the file sink under `LOG_DIR` (default `./logs`)
    pub fn from_env(level: &str) -> Self {
        let file_enabled = std::env::var("ENABLE_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let file_dir = file_enabled.then(|| {
            PathBuf::from(std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string()))
        });

        Self {
            level: level.to_string(),
            file_dir,
        }
    }
}

/// Install the global subscriber. A second call is a no-op apart from a stderr note.
pub fn init_tracing(targets: &LogTargets) -> Option<FileLogGuard> {
    let env_filter =
        EnvFilter::try_new(&targets.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(true);

    let file_sink = targets.file_dir.as_ref().and_then(|dir| {
        match std::fs::create_dir_all(dir) {
            Ok(()) => Some(tracing_appender::non_blocking(RollingFileAppender::new(
                Rotation::DAILY,
                dir,
                LOG_FILE_PREFIX,
            ))),
            Err(err) => {
                eprintln!("failed to create log directory {}: {err}", dir.display());
                None
            }
        }
    });

    match file_sink {
        Some((writer, guard)) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            let installed = tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(file_layer)
                .try_init();
            if let Err(err) = installed {
                eprintln!("tracing already initialised: {err}");
                return None;
            }
            Some(FileLogGuard { _guard: guard })
        }
        None => {
            if let Err(err) = tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .try_init()
            {
                eprintln!("tracing already initialised: {err}");
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdout_only_targets() {
        let targets = LogTargets {
            level: "debug".to_string(),
            file_dir: None,
        };
        assert!(init_tracing(&targets).is_none());
        // second install must not panic
        assert!(init_tracing(&targets).is_none());
    }
}
