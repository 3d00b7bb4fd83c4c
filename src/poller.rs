use std::{fmt::Display, time::Duration};

use reqwest::Client;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::debug;

use crate::{
    error::{DashboardError, Result},
    status::{StatusReport, StatusUpdate},
};

/// Pulls auxiliary status text from a fixed HTTP endpoint.
///
/// A failed poll is never retried on the spot; the next scheduled poll is
/// the retry.
#[derive(Debug, Clone)]
pub struct StatusPoller {
    client: Client,
    url: String,
}

impl StatusPoller {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| failure(&url, e))?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One GET against the status endpoint. Any 2xx answer with a JSON object
    /// body is accepted.
    pub async fn poll(&self) -> Result<StatusReport> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| failure(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure(&self.url, format!("HTTP {status}")));
        }

        response
            .json::<StatusReport>()
            .await
            .map_err(|e| failure(&self.url, e))
    }

    /// Runs `poll` in the background and forwards a success as `seq`.
    pub fn spawn_poll(&self, seq: u64, updates: mpsc::Sender<StatusUpdate>) -> JoinHandle<()> {
        let poller = self.clone();
        tokio::spawn(async move {
            match poller.poll().await {
                Ok(report) => {
                    if updates.send(StatusUpdate { seq, report }).await.is_err() {
                        debug!(seq, "status receiver gone");
                    }
                }
                Err(err) => debug!(error = %err, seq, "status poll dropped"),
            }
        })
    }
}

fn failure(url: &str, reason: impl Display) -> DashboardError {
    DashboardError::Poll {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}
