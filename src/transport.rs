//! Websocket transport for one assistant chat session.
//!
//! `TransportSession` owns exactly one connection. Opening never fails from
//! the caller's point of view: the handshake runs on a spawned task and any
//! failure is observed only through the connectivity signal flipping to
//! `Closed`. Queries sent while the socket is not open are dropped.
//!
//! The spawned task is the only concurrent piece. It talks to the owner
//! through an outbound query channel, an inbound event channel and a `watch`
//! channel carrying the connection state.

use std::sync::Arc;

use frames::ServerEvent;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::{COOKIE, InvalidHeaderValue};
use tracing::{debug, info, warn};

use crate::config::ChatConfig;

/// Lifecycle of a single transport instance. `Closed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    #[must_use]
    pub fn is_open(self) -> bool {
        self == Self::Open
    }
}

/// The surface the chat controller needs from a connection.
pub trait Transport {
    fn state(&self) -> ConnectionState;

    fn subscribe_state(&self) -> watch::Receiver<ConnectionState>;

    /// Queue `query` for sending. Returns `false` when the frame was dropped
    /// because the connection is not open.
    fn send(&self, query: &str) -> bool;

    /// Release the connection. Idempotent.
    fn close(&mut self);
}

/// Failures inside the I/O task. Logged there, never returned to callers.
#[derive(Debug, thiserror::Error)]
enum TransportError {
    #[error("invalid websocket request: {0}")]
    Request(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("invalid cookie header: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
    #[error("websocket connect failed: {0}")]
    Handshake(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket i/o failed: {0}")]
    Socket(Box<tokio_tungstenite::tungstenite::Error>),
}

/// One duplex websocket connection to the ask endpoint.
pub struct TransportSession {
    state: Arc<watch::Sender<ConnectionState>>,
    outbound: Option<mpsc::UnboundedSender<String>>,
    events: Option<mpsc::UnboundedReceiver<ServerEvent>>,
    task: Option<JoinHandle<()>>,
}

impl TransportSession {
    /// Open the ask endpoint described by `config`.
    #[must_use]
    pub fn connect(config: &ChatConfig) -> Self {
        Self::open(&config.ask_url(), config.cookie_header())
    }

    /// Start connecting to `url`, sending `cookie` as the `Cookie` handshake
    /// header when given.
    ///
    /// Returns immediately in the `Connecting` state. Must be called from
    /// within a tokio runtime.
    #[must_use]
    pub fn open(url: &str, cookie: Option<String>) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Connecting);
        let state = Arc::new(state_tx);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run_connection(
            url.to_owned(),
            cookie,
            Arc::clone(&state),
            outbound_rx,
            events_tx,
        ));

        Self { state, outbound: Some(outbound_tx), events: Some(events_rx), task: Some(task) }
    }

    /// Take the inbound event stream. Each decoded frame arrives once, in
    /// transport order. Returns `None` after the first call.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<ServerEvent>> {
        self.events.take()
    }
}

impl Transport for TransportSession {
    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    fn send(&self, query: &str) -> bool {
        if !self.state().is_open() {
            debug!(state = ?self.state(), "dropping query; websocket not open");
            return false;
        }
        let Some(outbound) = &self.outbound else {
            return false;
        };
        outbound.send(frames::encode_query(query)).is_ok()
    }

    fn close(&mut self) {
        let previous = self.state.send_replace(ConnectionState::Closed);

        // Dropping the sender lets the I/O task send a close frame and exit.
        self.outbound = None;

        if let Some(task) = self.task.take() {
            if previous == ConnectionState::Connecting {
                task.abort();
            }
        }
    }
}

impl Drop for TransportSession {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_connection(
    url: String,
    cookie: Option<String>,
    state: Arc<watch::Sender<ConnectionState>>,
    outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<ServerEvent>,
) {
    match connect_and_run(&url, cookie, &state, outbound, &events).await {
        Ok(()) => info!(%url, "websocket closed"),
        Err(e) => warn!(%url, error = %e, "websocket session ended"),
    }
    state.send_replace(ConnectionState::Closed);
}

async fn connect_and_run(
    url: &str,
    cookie: Option<String>,
    state: &watch::Sender<ConnectionState>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: &mpsc::UnboundedSender<ServerEvent>,
) -> Result<(), TransportError> {
    let mut request = url
        .into_client_request()
        .map_err(|e| TransportError::Request(Box::new(e)))?;
    if let Some(cookie) = cookie {
        request.headers_mut().insert(COOKIE, HeaderValue::from_str(&cookie)?);
    }

    let (stream, _) = connect_async(request)
        .await
        .map_err(|e| TransportError::Handshake(Box::new(e)))?;

    let opened = state.send_if_modified(|s| {
        if *s == ConnectionState::Connecting {
            *s = ConnectionState::Open;
            true
        } else {
            false
        }
    });
    if !opened {
        // Closed by the owner while the handshake was in flight.
        return Ok(());
    }
    info!(%url, "websocket open");

    let (mut ws_write, mut ws_read) = stream.split();

    loop {
        tokio::select! {
            outgoing = outbound.recv() => {
                let Some(text) = outgoing else {
                    let _ = ws_write.send(Message::Close(None)).await;
                    return Ok(());
                };
                ws_write
                    .send(Message::text(text))
                    .await
                    .map_err(|e| TransportError::Socket(Box::new(e)))?;
            }
            incoming = ws_read.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => match frames::decode_event(text.as_str()) {
                        Ok(event) => {
                            debug!(kind = event.tag(), "inbound frame");
                            let _ = events.send(event);
                        }
                        Err(e) => debug!(error = %e, "dropping malformed frame"),
                    },
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(TransportError::Socket(Box::new(e))),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
