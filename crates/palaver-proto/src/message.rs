//! Chat message envelope and file metadata.
//!
//! Group messages arrive inside `/msg` responses as JSON-serialized strings;
//! private messages arrive as plain objects from `/private/messages/:id`.
//! Both share the `text` / `file` / `sys` type tag.

use serde::{Deserialize, Serialize};

/// Message type tag.
///
/// A missing or unknown tag is treated as plain text, matching how the
/// original client falls through to the text path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// File attachment message.
    File,
    /// System tip broadcast by the server.
    Sys,
    /// Plain text message. `#[serde(other)]` requires the catch-all
    /// variant to come last.
    #[default]
    #[serde(other)]
    Text,
}

/// Metadata for an uploaded file attached to a `file` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Original file name as uploaded.
    pub name: String,
    /// Server-side storage name (download path component).
    pub filename: String,
    /// File size in bytes.
    pub size: u64,
}

impl FileInfo {
    /// Kind classification for this file, by extension heuristic.
    pub fn kind(&self) -> FileKind {
        FileKind::from_name(&self.name)
    }
}

/// Coarse file classification used to pick attachment presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Raster image formats.
    Image,
    /// Video containers.
    Video,
    /// Audio formats.
    Audio,
    /// Text-ish documents.
    Document,
    /// Compressed archives.
    Archive,
    /// Anything unrecognized.
    Other,
}

impl FileKind {
    /// Classify a file name by its extension (case-insensitive).
    ///
    /// The extension lists are part of the presentation contract inherited
    /// from the server's web client and must not drift.
    pub fn from_name(name: &str) -> Self {
        let ext = name.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" => Self::Image,
            "mp4" | "avi" | "mov" | "wmv" | "flv" | "webm" => Self::Video,
            "mp3" | "wav" | "flac" | "aac" | "ogg" => Self::Audio,
            "pdf" | "doc" | "docx" | "txt" | "rtf" => Self::Document,
            "zip" | "rar" | "7z" | "tar" | "gz" => Self::Archive,
            _ => Self::Other,
        }
    }

    /// Uppercase label for attachment blocks.
    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
            Self::Audio => "AUDIO",
            Self::Document => "DOCUMENT",
            Self::Archive => "ARCHIVE",
            Self::Other => "OTHER",
        }
    }
}

/// Format a byte count the way the server's web client does.
///
/// `0` is special-cased; otherwise the largest power-of-1024 unit up to GB
/// is used, with up to two decimals and trailing zeros trimmed.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let mut text = format!("{value:.2}");
    if text.contains('.') {
        text = text.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{} {}", text, UNITS[exponent])
}

/// A group chat message as serialized inside `/msg` response lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Message type tag.
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    /// Sender display name. Absent for `sys` tips.
    #[serde(default)]
    pub name: String,
    /// Sender's opaque session key, used for own-message detection.
    #[serde(default)]
    pub key: String,
    /// Message body (tip text for `sys`).
    #[serde(default)]
    pub msg: String,
    /// Server-formatted timestamp, when present.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Attachment metadata for `file` messages.
    #[serde(rename = "fileInfo", default)]
    pub file_info: Option<FileInfo>,
}

/// A private chat message from `/private/messages/:chat_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateMessage {
    /// Sender's opaque session key.
    pub from: String,
    /// Sender display name.
    pub from_name: String,
    /// Message body.
    pub msg: String,
    /// Message type tag.
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    /// Server-formatted timestamp, when present.
    #[serde(default)]
    pub timestamp: Option<String>,
}
