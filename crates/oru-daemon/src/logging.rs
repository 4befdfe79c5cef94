//! Process-wide `tracing` subscriber setup.
//!
//! The subscriber is installed once, before the singleton check, so that
//! the check's outcome is logged. A forked daemon inherits it along with
//! the open log file.

use std::fs::OpenOptions;
use std::sync::Mutex;

use oru_config::LoggingConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::DaemonError;

/// Pick the filter directive: `-v` flags beat the configured level.
pub fn filter_directive(config: &LoggingConfig, verbose: u8) -> &str {
    match verbose {
        0 => config.level.as_str(),
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over both config and verbosity. Calling
/// this again once a subscriber is installed is a no-op.
pub fn init(config: &LoggingConfig, verbose: u8) -> Result<(), DaemonError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config, verbose)));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| DaemonError::io(format!("failed to open log file {path}"), e))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    if installed.is_err() {
        debug!("Global subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_verbosity_overrides_level() {
        let config = LoggingConfig::default();
        assert_eq!(filter_directive(&config, 0), "info");
        assert_eq!(filter_directive(&config, 1), "debug");
        assert_eq!(filter_directive(&config, 5), "trace");
    }

    #[test]
    fn test_unwritable_log_file_is_an_error() {
        let config = LoggingConfig {
            level: "info".to_string(),
            file: Some("/nonexistent-dir/oru/daemon.log".to_string()),
        };
        let err = init(&config, 0).unwrap_err();
        assert!(matches!(err, DaemonError::Io { .. }));
    }

    #[test]
    fn test_log_file_is_created() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("daemon.log");
        let config = LoggingConfig {
            level: "info".to_string(),
            file: Some(path.display().to_string()),
        };
        init(&config, 0).unwrap();
        assert!(path.exists());
    }
}
