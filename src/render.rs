//! Plain-text rendering of the chat feed for terminal front-ends.
//!
//! Messages are printed once, the first time their id shows up in a
//! snapshot. A resolved placeholder therefore prints its bot answer below
//! the `...` line rather than rewriting it.

use std::collections::HashSet;
use std::io::{self, Write};

use uuid::Uuid;

use crate::message::{ChatMessage, MessageBody};
use crate::transport::ConnectionState;

#[derive(Debug, Default)]
pub struct FeedPrinter {
    printed: HashSet<Uuid>,
}

impl FeedPrinter {
    /// Write every message in `log` not printed before. Returns how many were written.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`.
    pub fn render<W: Write>(&mut self, log: &[ChatMessage], out: &mut W) -> io::Result<usize> {
        let mut written = 0;
        for msg in log {
            if !self.printed.insert(msg.id) {
                continue;
            }
            write_message(msg, out)?;
            written += 1;
        }
        out.flush()?;
        Ok(written)
    }
}

fn write_message<W: Write>(msg: &ChatMessage, out: &mut W) -> io::Result<()> {
    match &msg.body {
        MessageBody::User(text) => writeln!(out, "you> {text}"),
        MessageBody::Bot(text) => writeln!(out, "assistant> {text}"),
        MessageBody::Loading(text) => writeln!(out, "assistant> {text}..."),
        MessageBody::Sources(urls) => {
            writeln!(out, "sources:")?;
            for url in urls {
                writeln!(out, "  - {url}")?;
            }
            Ok(())
        }
    }
}

/// Status line for a connectivity state.
#[must_use]
pub fn status_line(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Connecting => "[connecting...]",
        ConnectionState::Open => "[online]",
        ConnectionState::Closed => "[disconnected]",
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
