//! Merge inbound server events into the chat log.
//!
//! DESIGN
//! ======
//! Reconciliation is a pure `(log, event) -> log` transform with no transport
//! or timer state, so it can be exercised without a network. A `final` event
//! resolves the most recent `Loading` placeholder in place, keeping the answer
//! directly under the query that produced it. With no placeholder pending the
//! answer is appended at the end. A `final` whose answer is already in the log
//! as a bot message is treated as a retransmission and dropped.

use frames::{FinalAnswer, ServerEvent};

use crate::message::{ChatMessage, MessageBody};

/// What applying an event did to the log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A placeholder at `index` was replaced by the answer.
    Resolved { index: usize },
    /// No placeholder was pending; the answer was appended at `index`.
    Appended { index: usize },
    /// The answer was already present; the log is unchanged.
    Duplicate,
    /// The event type is not applied to the log.
    Ignored,
}

impl Outcome {
    #[must_use]
    pub fn changed(self) -> bool {
        matches!(self, Self::Resolved { .. } | Self::Appended { .. })
    }
}

/// Apply any server event to `log`.
///
/// Only `final` events touch the log; every other type is a no-op.
#[must_use]
pub fn apply(log: Vec<ChatMessage>, event: &ServerEvent) -> (Vec<ChatMessage>, Outcome) {
    match event {
        ServerEvent::Final(answer) => reconcile(log, answer),
        _ => (log, Outcome::Ignored),
    }
}

/// Merge a terminal answer into `log`.
#[must_use]
pub fn reconcile(mut log: Vec<ChatMessage>, answer: &FinalAnswer) -> (Vec<ChatMessage>, Outcome) {
    let bot = MessageBody::Bot(answer.answer.clone());
    if log.iter().any(|m| m.body == bot) {
        return (log, Outcome::Duplicate);
    }

    let (index, outcome) = match latest_placeholder(&log) {
        Some(index) => {
            log[index] = ChatMessage::new(bot);
            (index, Outcome::Resolved { index })
        }
        None => {
            log.push(ChatMessage::new(bot));
            let index = log.len() - 1;
            (index, Outcome::Appended { index })
        }
    };

    if !answer.sources.is_empty() {
        log.insert(index + 1, ChatMessage::sources(answer.sources.clone()));
    }

    (log, outcome)
}

/// Index of the most recent `Loading` message, scanning from the end.
#[must_use]
pub fn latest_placeholder(log: &[ChatMessage]) -> Option<usize> {
    log.iter().rposition(ChatMessage::is_loading)
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
