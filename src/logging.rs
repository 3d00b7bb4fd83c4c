use std::{fs::OpenOptions, io, path::PathBuf, sync::Mutex};

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILE: &str = "event_pulse.log";

/// Installs the global subscriber.
///
/// Filter comes from `PULSE_LOG`, then `RUST_LOG`, then `info`. Headless
/// mode logs to stderr. With the terminal UI up, logs are appended to
/// `PULSE_LOG_FILE`, or to `event_pulse.log` in the system temp directory
/// when that is unset, so they cannot scribble over the screen. If the file
/// cannot be opened, logging is discarded.
pub fn init(headless: bool) {
    let filter = EnvFilter::try_from_env("PULSE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if headless {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init();
        return;
    }

    let path = log_file_path(|key| std::env::var(key).ok());
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        Err(_) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
}

/// Where the terminal UI sends its logs.
pub fn log_file_path<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup("PULSE_LOG_FILE")
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_log_file_falls_back_to_temp_dir() {
        let path = log_file_path(|_| None);
        assert_eq!(path, std::env::temp_dir().join("event_pulse.log"));
        let blank = log_file_path(|_| Some("   ".to_string()));
        assert_eq!(blank, path);
    }

    #[test]
    fn explicit_log_file_wins() {
        let path = log_file_path(|key| (key == "PULSE_LOG_FILE").then(|| "/var/log/pulse.log".to_string()));
        assert_eq!(path, PathBuf::from("/var/log/pulse.log"));
    }
}
