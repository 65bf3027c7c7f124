//! Application input events.
//!
//! [`AppEvent`] is the full set of inputs that drive the [`crate::App`]
//! state machine. Events come from two sources: user interaction (keys,
//! resize, ticks) delivered by the driver, and protocol notifications
//! translated from client actions by the [`crate::Bridge`].

use palaver_client::PrivateChatSummary;
use palaver_proto::{PrivateMessage, WireMessage};

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Login completed.
    LoggedIn {
        /// Display name granted by the server.
        name: String,
        /// Session key.
        key: String,
    },

    /// Session ended; drop all chat state.
    LoggedOut,

    /// New group messages arrived.
    MessagesDelivered(Vec<WireMessage>),

    /// The active-user list changed.
    UsersUpdated(Vec<String>),

    /// The group log was wiped server-side.
    LogCleared,

    /// A system tip for the group log.
    TipPosted(String),

    /// The private chat list changed.
    PrivateChatsUpdated(Vec<PrivateChatSummary>),

    /// The open window's history arrived.
    PrivateHistoryLoaded {
        /// Chat the history belongs to.
        chat_id: String,
        /// Full history, oldest first.
        messages: Vec<PrivateMessage>,
    },

    /// A private window opened.
    WindowOpened {
        /// Chat now shown.
        chat_id: String,
        /// The other party's display name.
        other_name: String,
    },

    /// The private window closed.
    WindowClosed,

    /// A blocking notice to show.
    DialogRaised(String),

    /// Return to the group view (reset sweep, lost window).
    ForcedGroupView,

    /// Polling stopped after a failure; show the retry hint.
    RetryOffered,

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}
