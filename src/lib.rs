//! # medtrack-chat
//!
//! Client for the MedTrack pharmacy assistant's streaming chat endpoint.
//!
//! A [`session::ChatSession`] owns one websocket [`transport::TransportSession`]
//! and an ordered log of [`message::ChatMessage`]s. User queries go out as
//! `{"query": ..}` frames; terminal `final` answers come back and are merged
//! into the log by the pure [`reconcile`] transform. Presentation layers
//! subscribe to the log and the connectivity flag and never mutate either.

pub mod auth;
pub mod config;
pub mod message;
pub mod reconcile;
pub mod render;
pub mod session;
pub mod transport;

pub use config::ChatConfig;
pub use message::{ChatMessage, MessageBody, MessageKind};
pub use session::{ChatSession, Phase, SendOutcome};
pub use transport::{ConnectionState, Transport, TransportSession};
