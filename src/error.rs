use std::io;

/// Failure modes of the dashboard.
///
/// Only `Terminal` ever ends the process. Connection and poll failures are
/// logged and retried on the next scheduled attempt, so a broken source shows
/// up as stale or flat data rather than an error on screen.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// The push channel could not be established, or a live one failed.
    #[error("push channel {url} unavailable: {source}")]
    Connection {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    /// A status request failed or returned something other than a status object.
    #[error("status poll of {url} failed: {reason}")]
    Poll { url: String, reason: String },

    /// An environment override could not be parsed or is out of range.
    #[error("invalid setting {key}={value}")]
    Config { key: &'static str, value: String },

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
