//! Observable application state types.
//!
//! The "view model" of the application: what the renderer needs to draw the
//! UI, with the protocol mechanics kept out. [`crate::App`] owns one of each
//! of these and mutates them as events arrive.

use palaver_proto::{FileInfo, MessageKind, PrivateMessage, WireMessage};

/// Which screen the UI shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Login form.
    Login,
    /// Group chat with the user sidebar.
    Group,
    /// List of active private chats.
    PrivateList,
    /// The single open private window.
    PrivateWindow,
}

/// Which login field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    /// Nickname input.
    Nickname,
    /// Admin password input (optional).
    Password,
}

/// Login form state.
#[derive(Debug, Clone)]
pub struct LoginForm {
    /// Nickname input.
    pub nickname: String,
    /// Admin password input.
    pub password: String,
    /// Field with focus.
    pub field: LoginField,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self { nickname: String::new(), password: String::new(), field: LoginField::Nickname }
    }
}

/// Logged-in identity as the UI sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Display name granted by the server.
    pub name: String,
    /// Session key, used to mark own messages.
    pub key: String,
}

/// One line of the group chat log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// A chat message.
    Chat(ChatLine),
    /// A system tip (joins, leaves, resets).
    Tip(String),
}

/// A rendered group chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    /// Message type tag.
    pub kind: MessageKind,
    /// Sender display name.
    pub name: String,
    /// Sent by this session.
    pub own: bool,
    /// Message body.
    pub text: String,
    /// Server-formatted timestamp, when present.
    pub timestamp: Option<String>,
    /// Attachment metadata for file messages.
    pub file: Option<FileInfo>,
}

impl ChatLine {
    /// Build a log line from a wire message, marking it as own when the
    /// sender key matches `session_key`.
    pub fn from_wire(msg: WireMessage, session_key: &str) -> Self {
        Self {
            own: !msg.key.is_empty() && msg.key == session_key,
            kind: msg.kind,
            name: msg.name,
            text: msg.msg,
            timestamp: msg.timestamp,
            file: msg.file_info,
        }
    }
}

/// Single-line text input with a character cursor.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Buffer contents.
    pub buffer: String,
    /// Cursor position in characters.
    pub cursor: usize,
}

impl InputState {
    /// Insert a character at the cursor.
    pub fn insert(&mut self, ch: char) {
        let byte = self.byte_at(self.cursor);
        self.buffer.insert(byte, ch);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte = self.byte_at(self.cursor);
            self.buffer.remove(byte);
        }
    }

    /// Delete the character at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.buffer.chars().count() {
            let byte = self.byte_at(self.cursor);
            self.buffer.remove(byte);
        }
    }

    /// Move the cursor one character left.
    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move the cursor one character right.
    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.buffer.chars().count());
    }

    /// Move the cursor to the start.
    pub fn home(&mut self) {
        self.cursor = 0;
    }

    /// Move the cursor to the end.
    pub fn end(&mut self) {
        self.cursor = self.buffer.chars().count();
    }

    /// Take the buffer contents and reset the cursor.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    /// Append a string and move the cursor past it.
    pub fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.cursor = self.buffer.chars().count();
    }

    fn byte_at(&self, char_index: usize) -> usize {
        self.buffer.char_indices().nth(char_index).map_or(self.buffer.len(), |(b, _)| b)
    }
}

/// The open private window.
#[derive(Debug, Clone)]
pub struct PrivateWindowState {
    /// Chat shown in the window.
    pub chat_id: String,
    /// The other party's display name.
    pub other_name: String,
    /// Full history, oldest first.
    pub messages: Vec<PrivateMessage>,
}

/// Blocking overlay on top of the current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// Notice with a single dismiss action.
    Notice(String),
    /// Destroy-confirmation for a private chat.
    ConfirmDestroy {
        /// Chat the confirmation is about.
        chat_id: String,
        /// Peer name shown in the prompt.
        other_name: String,
    },
}
