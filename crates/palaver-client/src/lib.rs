//! Client
//!
//! Action-based client state machine for the palaver chatroom protocol.
//! Manages the session, the adaptive message poller, the private chat
//! registry and window, and the reset sweep.
//!
//! # Architecture
//!
//! The client is Sans-IO: it receives events ([`ClientEvent`]), processes
//! them through pure state machine logic, and returns actions
//! ([`ClientAction`]) for the caller to execute. HTTP requests go out as
//! [`palaver_proto::ApiRequest`] values inside actions; their typed results
//! come back as [`ClientEvent::Response`]. Timers are owned by the caller
//! and driven through `*Due` events; the client only asks for them to be
//! re-armed or stopped.
//!
//! # Components
//!
//! - [`Client`]: top-level state machine
//! - [`PollTuner`]: adaptive group-poll interval control
//! - [`PrivateChats`]: private chat registry and the single open window
//! - [`ResetGuard`]: one-shot dialog suppression after a server reset
//!
//! Generic over an instant type so tests can drive a virtual clock.

#![forbid(unsafe_code)]

mod client;
mod error;
mod event;
mod poller;
mod private;
mod reset;
mod session;

pub use client::Client;
pub use error::ClientError;
pub use event::{ClientAction, ClientEvent};
pub use poller::{POLL_INITIAL, POLL_MAX, POLL_MIN, PollPhase, PollTuner};
pub use private::{PrivateChatSummary, PrivateChats, is_peer_gone};
pub use reset::ResetGuard;
pub use session::{MessageCursor, Session};
