//! Application side-effects and intents.
//!
//! [`AppAction`] values are instructions produced by the [`crate::App`]
//! state machine for the runtime to execute. Protocol intents go through
//! the [`crate::Bridge`]; `Render` and `Quit` are handled by the runtime
//! directly.

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Log in with the given credentials.
    Login {
        /// Requested nickname.
        nickname: String,
        /// Admin password; empty for regular users.
        password: String,
    },

    /// End the session.
    Logout,

    /// Send a group message.
    SendMessage {
        /// Message text.
        text: String,
    },

    /// Upload files to the group chat.
    UploadFiles {
        /// Local file paths.
        paths: Vec<String>,
    },

    /// Open a private chat from the registry.
    OpenPrivateChat {
        /// Chat to open.
        chat_id: String,
    },

    /// Close the private window, keeping the chat alive.
    ClosePrivateChat,

    /// Destroy a private chat for both parties.
    DestroyPrivateChat {
        /// Chat to destroy.
        chat_id: String,
    },

    /// Send a message to the open private window.
    SendPrivateMessage {
        /// Message text.
        text: String,
    },

    /// Ask for a fresh private chat list.
    RefreshPrivateChats,

    /// Resume polling after a failure.
    RetryPolling,

    /// Report user activity so the poll tightens.
    Activity,
}
