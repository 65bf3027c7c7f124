//! Client events and actions.

use std::time::Duration;

use palaver_proto::{ApiError, ApiRequest, ApiResponse, PrivateMessage, RequestKind, WireMessage};

use crate::private::PrivateChatSummary;

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Executing [`ApiRequest`]s and feeding results back as [`Response`]
/// - Owning the three timers (poll, heartbeat, liveness) and reporting
///   their firings via the `*Due` events
/// - Forwarding user intents
///
/// Generic over `I` (instant type) to support both production
/// (`std::time::Instant`) and virtual-clock test environments.
///
/// [`Response`]: ClientEvent::Response
#[derive(Debug, Clone)]
pub enum ClientEvent<I = std::time::Instant> {
    /// User submitted the login form.
    Login {
        /// Requested nickname.
        nickname: String,
        /// Admin password; empty for regular users.
        password: String,
    },

    /// User asked to log out.
    Logout,

    /// User submitted a group message.
    SendMessage {
        /// Message text.
        text: String,
    },

    /// User asked to upload files to the group chat.
    UploadFiles {
        /// Local file paths.
        paths: Vec<String>,
    },

    /// User opened a private chat from the registry.
    OpenPrivateChat {
        /// Chat to open.
        chat_id: String,
    },

    /// User closed the private window without destroying the chat.
    ClosePrivateChat,

    /// User destroyed a private chat for both parties.
    DestroyPrivateChat {
        /// Chat to destroy.
        chat_id: String,
    },

    /// User submitted a private message to the open window.
    SendPrivateMessage {
        /// Message text.
        text: String,
    },

    /// User asked for a fresh private chat list.
    RefreshPrivateChats,

    /// User clicked the retry link after a poll failure.
    RetryPolling {
        /// Current time.
        now: I,
    },

    /// Local user activity worth tightening the poll for.
    Activity {
        /// Current time.
        now: I,
    },

    /// The group poll timer fired.
    PollDue {
        /// Current time.
        now: I,
    },

    /// The heartbeat timer fired.
    HeartbeatDue,

    /// The private liveness timer fired.
    LivenessDue,

    /// An [`ApiRequest`] completed.
    Response {
        /// Which request this completes.
        request: RequestKind,
        /// The typed reply or the transport failure.
        result: Result<ApiResponse, ApiError>,
        /// Current time.
        now: I,
    },
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Perform an HTTP request and feed the result back.
    Call(ApiRequest),

    /// Re-arm the group poll timer with this interval, replacing any
    /// existing deadline.
    SchedulePoll(Duration),

    /// Stop the group poll timer.
    StopPoll,

    /// Arm the heartbeat timer with this period.
    StartHeartbeat(Duration),

    /// Stop the heartbeat timer.
    StopHeartbeat,

    /// Arm the private liveness timer with this period.
    StartLiveness(Duration),

    /// Stop the private liveness timer.
    StopLiveness,

    /// Login succeeded.
    LoggedIn {
        /// Display name granted by the server.
        name: String,
        /// Session key, used for own-message detection.
        key: String,
    },

    /// Session ended; the caller should drop all chat UI state.
    LoggedOut,

    /// Append new group messages to the log.
    Deliver(Vec<WireMessage>),

    /// Replace the active-user list (already deduplicated).
    UsersUpdated(Vec<String>),

    /// Clear the group log (server reset or admin clear).
    ClearLog,

    /// Append a system tip line to the group log.
    Tip(String),

    /// Replace the private chat list.
    PrivateChatsUpdated(Vec<PrivateChatSummary>),

    /// Replace the open window's message history.
    PrivateHistory {
        /// Chat the history belongs to.
        chat_id: String,
        /// Full history, oldest first.
        messages: Vec<PrivateMessage>,
    },

    /// A private window opened (replacing any previous one).
    WindowOpened {
        /// Chat now shown.
        chat_id: String,
        /// The other party's display name.
        other_name: String,
    },

    /// The private window closed.
    WindowClosed,

    /// Show a blocking notice dialog.
    Dialog(String),

    /// Return the UI to the group view (reset sweep or lost window).
    ForceGroupView,

    /// Polling stopped after a failure; offer the manual retry link.
    RetryOffered,
}
