//! Configuration for the drill runtime.
//!
//! Every value has a compile-time default and can be overridden at runtime
//! via a dedicated environment variable. Numbers that do not parse fall back
//! to the default.

use std::path::PathBuf;
use std::time::Duration;

/// Default backend base URL.
const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Default HTTP request timeout (in seconds).
const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Default pause before the opponent replies (in milliseconds).
const DEFAULT_OPPONENT_DELAY_MS: u64 = 600;

/// Default directory for rolling log files.
const DEFAULT_LOG_DIR: &str = "logs";

/// Default number of lines per training session.
const DEFAULT_SESSION_SIZE: usize = 10;

/// Get the backend base URL.
///
/// Priority:
/// 1. `REPERTOIRE_API_URL` env variable if set
/// 2. `http://localhost:3000` as fallback
pub fn get_api_url() -> String {
    std::env::var("REPERTOIRE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Get the HTTP request timeout.
pub fn get_api_timeout() -> Duration {
    Duration::from_secs(env_number("REPERTOIRE_API_TIMEOUT_SECS", DEFAULT_API_TIMEOUT_SECS))
}

/// Get the delay before the simulated opponent moves.
pub fn get_opponent_delay() -> Duration {
    Duration::from_millis(env_number("REPERTOIRE_OPPONENT_DELAY_MS", DEFAULT_OPPONENT_DELAY_MS))
}

/// Get the log directory.
///
/// Priority:
/// 1. `REPERTOIRE_LOG_DIR` env variable if set
/// 2. `logs` as fallback
pub fn get_log_dir() -> PathBuf {
    if let Ok(path) = std::env::var("REPERTOIRE_LOG_DIR") {
        return PathBuf::from(path);
    }

    PathBuf::from(DEFAULT_LOG_DIR)
}

/// Get the default number of lines per session. Zero counts as unset.
pub fn get_session_size() -> usize {
    match env_number("REPERTOIRE_SESSION_SIZE", DEFAULT_SESSION_SIZE) {
        0 => DEFAULT_SESSION_SIZE,
        n => n,
    }
}

fn env_number<T: std::str::FromStr>(key: &str, default: T) -> T {
    parse_or(std::env::var(key).ok().as_deref(), default)
}

fn parse_or<T: std::str::FromStr>(value: Option<&str>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
