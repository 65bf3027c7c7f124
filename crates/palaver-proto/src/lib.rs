//! Wire contract for the palaver chatroom HTTP API.
//!
//! The server is an external collaborator; only the JSON shapes matter here.
//! This crate defines the request/response types for every endpoint the
//! client consumes, the chat message envelope, and the [`ApiRequest`] /
//! [`ApiResponse`] pair that forms the transport seam between the protocol
//! state machines and whatever actually performs HTTP.
//!
//! Field names follow the server contract verbatim (`n`, `p`, `chat_id`,
//! `fileInfo`, ...), with serde renames where Rust naming differs.

#![forbid(unsafe_code)]

mod api;
mod message;

pub use api::{
    ApiError, ApiRequest, ApiResponse, LoginReply, LoginRequest, MsgResponse, PrivateChatsReply,
    PrivateExitReply, PrivateExitRequest, PrivateMessagesReply, PrivateSendReply,
    PrivateSendRequest, RequestKind, SendReply, SendRequest, UploadReply, WirePrivateChat,
    WirePrivateLastMessage,
};
pub use message::{FileInfo, FileKind, MessageKind, PrivateMessage, WireMessage, format_file_size};
