//! Chat session controller.
//!
//! DESIGN
//! ======
//! `ChatSession` exclusively owns the message log and the transport. The
//! presentation layer gets read-only projections: a `watch` feed of the log
//! and the transport's connectivity signal. It never mutates the log.
//!
//! The controller's methods run to completion without awaiting; inbound
//! events reach it through [`ChatSession::pump`] or
//! [`ChatSession::handle_event`], one at a time and in transport order.
//!
//! At most one `Loading` placeholder is live. A query sent while another is
//! pending supersedes the older placeholder, and the next `final` fills it
//! whichever query it answers. The backend answers in request order, so the
//! first query's answer lands in the placeholder under the newest query and
//! the later answer, finding no placeholder, is appended after it.

use frames::ServerEvent;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::ChatConfig;
use crate::message::ChatMessage;
use crate::reconcile::{self, Outcome};
use crate::transport::{ConnectionState, Transport, TransportSession};

/// Whether a query is outstanding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingAnswer,
}

/// Result of [`ChatSession::send_query`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input. Nothing was appended or sent.
    Rejected,
    /// Appended to the log and handed to an open transport.
    Sent,
    /// Appended to the log, but the transport was not open and dropped it.
    Undelivered,
}

pub struct ChatSession<T: Transport> {
    transport: T,
    log: Vec<ChatMessage>,
    feed: watch::Sender<Vec<ChatMessage>>,
    placeholder: String,
}

impl ChatSession<TransportSession> {
    /// Open a websocket session for `config`.
    ///
    /// Returns the controller and the inbound event stream to feed into
    /// [`ChatSession::pump`]. The caller is expected to be authenticated
    /// already (see [`crate::auth::verify_session`]).
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn connect(config: &ChatConfig) -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let mut transport = TransportSession::connect(config);
        let events = transport
            .take_events()
            .unwrap_or_else(|| mpsc::unbounded_channel().1);
        (Self::new(transport, config.placeholder.clone()), events)
    }
}

impl<T: Transport> ChatSession<T> {
    #[must_use]
    pub fn new(transport: T, placeholder: impl Into<String>) -> Self {
        let (feed, _) = watch::channel(Vec::new());
        Self { transport, log: Vec::new(), feed, placeholder: placeholder.into() }
    }

    /// Append `text` as a user message plus a placeholder, then send it.
    ///
    /// Blank input is rejected before any side effect. When the transport is
    /// not open the messages are still appended so the attempt stays visible.
    pub fn send_query(&mut self, text: &str) -> SendOutcome {
        let query = text.trim();
        if query.is_empty() {
            return SendOutcome::Rejected;
        }

        if self.phase() == Phase::AwaitingAnswer {
            debug!("superseding pending placeholder");
            self.log.retain(|m| !m.is_loading());
        }
        self.log.push(ChatMessage::user(query));
        self.log.push(ChatMessage::loading(self.placeholder.as_str()));
        self.publish();

        if self.transport.send(query) {
            SendOutcome::Sent
        } else {
            info!(state = ?self.transport.state(), "query not delivered; transport not open");
            SendOutcome::Undelivered
        }
    }

    /// Apply one inbound event to the log.
    pub fn handle_event(&mut self, event: ServerEvent) -> Outcome {
        match &event {
            ServerEvent::Error { message } => warn!(%message, "assistant returned an error"),
            ServerEvent::Final(_) => {}
            other => debug!(kind = other.tag(), "ignoring server event"),
        }

        let (log, outcome) = reconcile::apply(std::mem::take(&mut self.log), &event);
        self.log = log;

        match outcome {
            Outcome::Duplicate => debug!("duplicate final answer dropped"),
            o if o.changed() => self.publish(),
            _ => {}
        }
        outcome
    }

    /// Decode a raw text frame and apply it. Malformed frames are dropped.
    pub fn handle_frame(&mut self, raw: &str) -> Option<Outcome> {
        match frames::decode_event(raw) {
            Ok(event) => Some(self.handle_event(event)),
            Err(e) => {
                debug!(error = %e, "dropping malformed frame");
                None
            }
        }
    }

    /// Wait for the next inbound event and apply it.
    ///
    /// Returns `false` once the event stream has ended.
    pub async fn pump(&mut self, events: &mut mpsc::UnboundedReceiver<ServerEvent>) -> bool {
        match events.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.log
    }

    /// Subscribe to log snapshots. A new snapshot is published on every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<ChatMessage>> {
        self.feed.subscribe()
    }

    #[must_use]
    pub fn connectivity(&self) -> watch::Receiver<ConnectionState> {
        self.transport.subscribe_state()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.state().is_open()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        if reconcile::latest_placeholder(&self.log).is_some() {
            Phase::AwaitingAnswer
        } else {
            Phase::Idle
        }
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Close the transport. A pending placeholder stays unresolved.
    pub fn close(&mut self) {
        self.transport.close();
    }

    fn publish(&self) {
        self.feed.send_replace(self.log.clone());
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
