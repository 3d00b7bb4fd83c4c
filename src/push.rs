//! Websocket push client that feeds the event counter.
//!
//! The client runs as one supervised task. A failed connect is retried after a
//! fixed delay, forever. A connection that drops after it was established goes
//! through the same retry path. Message payloads are never parsed; arrival
//! alone counts. The opening handshake has its own deadline, so a peer that
//! accepts the socket but never answers the upgrade is retried like any other
//! failure.

use std::{io, time::Duration};

use futures_util::StreamExt;
use tokio::{
    net::TcpStream,
    sync::watch,
    task::JoinHandle,
};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, Message},
    MaybeTlsStream, WebSocketStream,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{constants::HANDSHAKE_TIMEOUT_MS, counter::EventCounter, error::DashboardError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushState {
    Connecting,
    Connected,
    Reconnecting,
}

impl PushState {
    pub fn label(self) -> &'static str {
        match self {
            PushState::Connecting => "connecting",
            PushState::Connected => "live",
            PushState::Reconnecting => "reconnecting",
        }
    }
}

/// Owner of the running push task. Dropping it aborts the task; `shutdown`
/// stops it cleanly.
#[derive(Debug)]
pub struct PushHandle {
    state: watch::Receiver<PushState>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PushHandle {
    pub fn state(&self) -> watch::Receiver<PushState> {
        self.state.clone()
    }

    pub fn current_state(&self) -> PushState {
        *self.state.borrow()
    }

    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PushHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub struct PushClient;

impl PushClient {
    /// Starts the push task on the current runtime. The handshake deadline is
    /// the retry delay, but never shorter than `HANDSHAKE_TIMEOUT_MS`.
    pub fn spawn(
        url: impl Into<String>,
        retry_delay: Duration,
        counter: EventCounter,
        cancel: CancellationToken,
    ) -> PushHandle {
        let handshake = retry_delay.max(Duration::from_millis(HANDSHAKE_TIMEOUT_MS));
        Self::spawn_with_timeout(url, retry_delay, handshake, counter, cancel)
    }

    pub fn spawn_with_timeout(
        url: impl Into<String>,
        retry_delay: Duration,
        handshake_timeout: Duration,
        counter: EventCounter,
        cancel: CancellationToken,
    ) -> PushHandle {
        let url = url.into();
        let (state_tx, state_rx) = watch::channel(PushState::Connecting);
        let task = tokio::spawn(supervise(
            url,
            retry_delay,
            handshake_timeout,
            counter,
            state_tx,
            cancel.clone(),
        ));
        PushHandle {
            state: state_rx,
            cancel,
            task: Some(task),
        }
    }
}

async fn supervise(
    url: String,
    retry_delay: Duration,
    handshake_timeout: Duration,
    counter: EventCounter,
    state: watch::Sender<PushState>,
    cancel: CancellationToken,
) {
    let mut attempt: u64 = 0;
    loop {
        attempt += 1;
        let connect = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = tokio::time::timeout(handshake_timeout, connect_async(url.as_str())) => match result {
                Ok(result) => result,
                Err(_) => Err(tungstenite::Error::Io(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "websocket handshake timed out",
                ))),
            },
        };

        match connect {
            Ok((ws, _)) => {
                info!(url = %url, attempt, "push channel connected");
                attempt = 0;
                state.send_replace(PushState::Connected);
                match pump(ws, &counter, &cancel).await {
                    Ok(()) if cancel.is_cancelled() => break,
                    Ok(()) => info!(url = %url, "push channel closed by peer"),
                    Err(source) => {
                        let err = DashboardError::Connection { url: url.clone(), source };
                        info!(error = %err, "push channel dropped");
                    }
                }
            }
            Err(source) => {
                let err = DashboardError::Connection { url: url.clone(), source };
                warn!(error = %err, attempt, retry_ms = retry_delay.as_millis() as u64, "push connect failed");
            }
        }

        state.send_replace(PushState::Reconnecting);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(retry_delay) => {}
        }
    }
    debug!(url = %url, "push task stopped");
}

/// Counts data frames until the peer goes away or we are cancelled.
async fn pump(
    mut ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    counter: &EventCounter,
    cancel: &CancellationToken,
) -> Result<(), tungstenite::Error> {
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let _ = ws.close(None).await;
                return Ok(());
            }
            next = ws.next() => next,
        };
        match next {
            Some(Ok(Message::Text(_) | Message::Binary(_))) => counter.increment(),
            Some(Ok(Message::Close(_))) | None => return Ok(()),
            Some(Ok(_)) => {}
            Some(Err(err)) => return Err(err),
        }
    }
}
