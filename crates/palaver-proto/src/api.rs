//! Endpoint request/response shapes and the transport seam.
//!
//! [`ApiRequest`] and [`ApiResponse`] let the protocol state machines stay
//! free of I/O: the client emits requests, the driver performs HTTP and
//! feeds the typed result back. [`RequestKind`] identifies which request a
//! failure belonged to, carrying just enough context for recovery.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::{PrivateMessage, WireMessage};

/// `POST /login` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Nickname.
    #[serde(rename = "n")]
    pub nickname: String,
    /// Admin password; empty for regular users.
    #[serde(rename = "p")]
    pub password: String,
}

/// `POST /login` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginReply {
    /// Display name as accepted by the server.
    pub name: String,
    /// Opaque session key.
    pub key: String,
    /// Current message version epoch.
    #[serde(default)]
    pub version: u64,
}

/// `GET /msg?k=<count>&v=<version>` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgResponse {
    /// Set when the client's version is stale and history was invalidated.
    #[serde(default)]
    pub reset: bool,
    /// New version epoch, when the server advanced it.
    #[serde(default)]
    pub version: Option<u64>,
    /// Total messages consumed after this batch (an offset, not a delta).
    #[serde(default)]
    pub count: u64,
    /// JSON-serialized [`WireMessage`] strings, in arrival order.
    #[serde(default)]
    pub list: Vec<String>,
    /// Current active-user names (may contain duplicates).
    #[serde(default)]
    pub users: Vec<String>,
}

impl MsgResponse {
    /// Parse the message list, skipping entries that fail to decode.
    ///
    /// A malformed entry is a server-side bug the client survives; order of
    /// the surviving messages is preserved.
    pub fn parsed_messages(&self) -> Vec<WireMessage> {
        self.list.iter().filter_map(|raw| serde_json::from_str(raw).ok()).collect()
    }
}

/// `POST /send` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    /// Message text.
    pub msg: String,
}

/// `POST /send` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReply {
    /// New version epoch, when the server advanced it.
    #[serde(default)]
    pub version: Option<u64>,
    /// Set when the message triggered an admin clear of all state.
    #[serde(default)]
    pub admin_clear: bool,
}

/// `POST /upload` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReply {
    /// `"success"` or a failure marker.
    pub result: String,
    /// New version epoch, when the server advanced it.
    #[serde(default)]
    pub version: Option<u64>,
    /// Server-provided failure detail.
    #[serde(default)]
    pub message: Option<String>,
}

impl UploadReply {
    /// Whether the upload was accepted.
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}

/// Preview of the last message in a private chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePrivateLastMessage {
    /// Preview text.
    pub content: String,
}

/// One active private chat as reported by `GET /private/chats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePrivateChat {
    /// Unique chat identifier.
    pub chat_id: String,
    /// The other party's display name.
    pub other_name: String,
    /// Last message preview, if any messages exist.
    #[serde(default)]
    pub last_message: Option<WirePrivateLastMessage>,
}

/// `GET /private/chats` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateChatsReply {
    /// `"success"` or a failure marker.
    pub result: String,
    /// The complete current active-chat set (wholesale, no deltas).
    #[serde(default)]
    pub active_chats: Vec<WirePrivateChat>,
}

impl PrivateChatsReply {
    /// Whether the snapshot is usable.
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}

/// `GET /private/messages/:chat_id` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateMessagesReply {
    /// `"success"` or a failure marker.
    pub result: String,
    /// Full message history, oldest first.
    #[serde(default)]
    pub messages: Vec<PrivateMessage>,
}

impl PrivateMessagesReply {
    /// Whether the history is usable.
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}

/// `POST /private/send` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateSendRequest {
    /// Target chat.
    pub chat_id: String,
    /// Message text.
    pub message: String,
}

/// `POST /private/send` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateSendReply {
    /// `"success"` or a failure marker.
    pub result: String,
    /// Server-provided failure detail (peer-gone detection keys off this).
    #[serde(default)]
    pub message: Option<String>,
}

impl PrivateSendReply {
    /// Whether the message was delivered.
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}

/// `POST /private/exit` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateExitRequest {
    /// Chat to destroy.
    pub chat_id: String,
}

/// `POST /private/exit` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateExitReply {
    /// `"success"` or a failure marker.
    pub result: String,
}

impl PrivateExitReply {
    /// Whether the chat was destroyed.
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}

/// One HTTP operation the client wants performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    /// `POST /login`.
    Login {
        /// Nickname.
        nickname: String,
        /// Admin password; empty for regular users.
        password: String,
    },
    /// `POST /logout` (fire-and-forget).
    Logout,
    /// `POST /heartbeat` (fire-and-forget).
    Heartbeat,
    /// `GET /msg?k=<count>&v=<version>`.
    FetchMessages {
        /// Consumed-message offset.
        count: u64,
        /// Version epoch the client believes current.
        version: u64,
    },
    /// `POST /send`.
    SendMessage {
        /// Message text.
        text: String,
    },
    /// `POST /upload` (multipart `files[]`; the driver reads the paths).
    Upload {
        /// Local file paths to upload.
        paths: Vec<String>,
    },
    /// `GET /private/chats`.
    FetchPrivateChats,
    /// `GET /private/messages/:chat_id`.
    FetchPrivateMessages {
        /// Target chat.
        chat_id: String,
    },
    /// `POST /private/send`.
    SendPrivateMessage {
        /// Target chat.
        chat_id: String,
        /// Message text.
        text: String,
    },
    /// `POST /private/exit`.
    ExitPrivateChat {
        /// Chat to destroy.
        chat_id: String,
    },
}

impl ApiRequest {
    /// The kind tag used to route the completion back into the client.
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Login { .. } => RequestKind::Login,
            Self::Logout => RequestKind::Logout,
            Self::Heartbeat => RequestKind::Heartbeat,
            Self::FetchMessages { .. } => RequestKind::FetchMessages,
            Self::SendMessage { .. } => RequestKind::Send,
            Self::Upload { .. } => RequestKind::Upload,
            Self::FetchPrivateChats => RequestKind::PrivateChats,
            Self::FetchPrivateMessages { chat_id } => {
                RequestKind::PrivateMessages { chat_id: chat_id.clone() }
            },
            Self::SendPrivateMessage { chat_id, .. } => {
                RequestKind::PrivateSend { chat_id: chat_id.clone() }
            },
            Self::ExitPrivateChat { chat_id } => {
                RequestKind::PrivateExit { chat_id: chat_id.clone() }
            },
        }
    }
}

/// Identifies which request a completion belongs to.
///
/// Carries the chat id for private operations so failure paths know which
/// conversation was affected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// `POST /login`.
    Login,
    /// `POST /logout`.
    Logout,
    /// `POST /heartbeat`.
    Heartbeat,
    /// `GET /msg`.
    FetchMessages,
    /// `POST /send`.
    Send,
    /// `POST /upload`.
    Upload,
    /// `GET /private/chats`.
    PrivateChats,
    /// `GET /private/messages/:chat_id`.
    PrivateMessages {
        /// Target chat.
        chat_id: String,
    },
    /// `POST /private/send`.
    PrivateSend {
        /// Target chat.
        chat_id: String,
    },
    /// `POST /private/exit`.
    PrivateExit {
        /// Chat that was being destroyed.
        chat_id: String,
    },
}

/// Typed result of a successfully transported [`ApiRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse {
    /// Login reply.
    Login(LoginReply),
    /// Logout acknowledged (body ignored).
    Logout,
    /// Heartbeat acknowledged (body ignored).
    Heartbeat,
    /// Poll reply.
    Messages(MsgResponse),
    /// Send reply.
    Send(SendReply),
    /// Upload reply.
    Upload(UploadReply),
    /// Private chat snapshot.
    PrivateChats(PrivateChatsReply),
    /// Private history reload.
    PrivateMessages {
        /// Chat the history belongs to.
        chat_id: String,
        /// The reply body.
        reply: PrivateMessagesReply,
    },
    /// Private send reply.
    PrivateSend(PrivateSendReply),
    /// Private exit reply.
    PrivateExit {
        /// Chat that was destroyed.
        chat_id: String,
        /// The reply body.
        reply: PrivateExitReply,
    },
}

/// Transport-level failure of an [`ApiRequest`].
///
/// The protocol state machines map these into their own error taxonomy;
/// this type only records what the transport observed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Non-success HTTP status.
    #[error("server returned status {0}")]
    Status(u16),
    /// Request timed out.
    #[error("request timed out")]
    Timeout,
    /// Connection-level failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Response body did not decode.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP 401 — bad admin credentials on login.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status(401))
    }

    /// HTTP 400/404/403 — the addressed resource is gone or refused.
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::Status(400 | 403 | 404))
    }

    /// HTTP 5xx.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Status(code) if *code >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiError, MsgResponse, PrivateChatsReply, SendReply};

    #[test]
    fn decodes_poll_response_with_embedded_messages() {
        let json = r#"{
            "version": 3,
            "count": 2,
            "list": [
                "{\"type\":\"text\",\"name\":\"alice\",\"key\":\"k1\",\"msg\":\"one\"}",
                "{\"type\":\"sys\",\"msg\":\"two\"}"
            ],
            "users": ["alice", "bob", "alice"]
        }"#;
        let resp: MsgResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.reset);
        assert_eq!(resp.version, Some(3));
        assert_eq!(resp.count, 2);
        assert_eq!(resp.parsed_messages().len(), 2);
    }

    #[test]
    fn malformed_list_entries_are_skipped_in_order() {
        let resp = MsgResponse {
            list: vec![
                r#"{"type":"text","msg":"first"}"#.to_string(),
                "not json".to_string(),
                r#"{"type":"text","msg":"last"}"#.to_string(),
            ],
            ..MsgResponse::default()
        };
        let msgs = resp.parsed_messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].msg, "first");
        assert_eq!(msgs[1].msg, "last");
    }

    #[test]
    fn decodes_reset_response_without_list() {
        let resp: MsgResponse = serde_json::from_str(r#"{"reset":true,"version":5}"#).unwrap();
        assert!(resp.reset);
        assert_eq!(resp.version, Some(5));
        assert!(resp.list.is_empty());
    }

    #[test]
    fn decodes_admin_clear_send_reply() {
        let reply: SendReply = serde_json::from_str(r#"{"admin_clear":true}"#).unwrap();
        assert!(reply.admin_clear);
        assert_eq!(reply.version, None);
    }

    #[test]
    fn decodes_private_chat_snapshot() {
        let json = r#"{
            "result": "success",
            "active_chats": [
                {"chat_id":"c1","other_name":"bob","last_message":{"content":"hey"}},
                {"chat_id":"c2","other_name":"carol"}
            ]
        }"#;
        let reply: PrivateChatsReply = serde_json::from_str(json).unwrap();
        assert!(reply.is_success());
        assert_eq!(reply.active_chats.len(), 2);
        assert!(reply.active_chats[1].last_message.is_none());
    }

    #[test]
    fn status_classification() {
        assert!(ApiError::Status(401).is_unauthorized());
        assert!(ApiError::Status(404).is_gone());
        assert!(ApiError::Status(400).is_gone());
        assert!(ApiError::Status(503).is_server_error());
        assert!(!ApiError::Timeout.is_server_error());
    }
}
