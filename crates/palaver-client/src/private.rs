//! Private chat registry and the single open window.
//!
//! The server owns chat lifetimes; the registry is a cache of the latest
//! `GET /private/chats` snapshot. At most one private window is open at a
//! time, and it remembers its own peer name so a snapshot that drops the
//! chat can still report who disappeared.

use palaver_proto::WirePrivateChat;

/// Substring test the server contract uses to signal a dead conversation.
///
/// `/private/send` failures carry a free-text `message`; the peer having
/// left is encoded as "离线" (offline) or "结束" (ended) appearing anywhere
/// in it. Part of the server contract, fragile as it looks.
pub fn is_peer_gone(message: &str) -> bool {
    message.contains("离线") || message.contains("结束")
}

/// One entry in the private chat list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateChatSummary {
    /// Unique chat identifier.
    pub chat_id: String,
    /// The other party's display name.
    pub other_name: String,
    /// Preview of the most recent message, if any.
    pub last_preview: Option<String>,
    /// The preview changed while this chat was not the open window.
    /// Cleared by [`PrivateChats::open`].
    pub has_unread: bool,
}

impl From<WirePrivateChat> for PrivateChatSummary {
    fn from(wire: WirePrivateChat) -> Self {
        Self {
            chat_id: wire.chat_id,
            other_name: wire.other_name,
            last_preview: wire.last_message.map(|m| m.content),
            has_unread: false,
        }
    }
}

/// Registry of active private chats plus the open window.
#[derive(Debug, Clone, Default)]
pub struct PrivateChats {
    chats: Vec<PrivateChatSummary>,
    /// `(chat_id, other_name)` of the open window.
    open: Option<(String, String)>,
}

impl PrivateChats {
    /// Current registry entries, in server order.
    pub fn summaries(&self) -> &[PrivateChatSummary] {
        &self.chats
    }

    /// Chat id of the open window, if any.
    pub fn open_chat_id(&self) -> Option<&str> {
        self.open.as_ref().map(|(id, _)| id.as_str())
    }

    /// Whether the open window shows the given chat.
    pub fn is_open(&self, chat_id: &str) -> bool {
        self.open_chat_id() == Some(chat_id)
    }

    /// Replace the registry with a server snapshot.
    ///
    /// A known chat whose preview changed is marked unread unless it is the
    /// open window; an unchanged chat keeps its flag. Returns `true` when
    /// the open window's chat vanished from the snapshot, which means the
    /// peer destroyed it.
    pub fn apply_snapshot(&mut self, snapshot: Vec<WirePrivateChat>) -> bool {
        let previous = std::mem::take(&mut self.chats);
        let open_id = self.open.as_ref().map(|(id, _)| id.clone());
        self.chats = snapshot
            .into_iter()
            .map(|wire| {
                let mut summary = PrivateChatSummary::from(wire);
                let viewing = open_id.as_deref() == Some(summary.chat_id.as_str());
                summary.has_unread = !viewing
                    && match previous.iter().find(|c| c.chat_id == summary.chat_id) {
                        Some(old) if old.last_preview == summary.last_preview => old.has_unread,
                        Some(_) => true,
                        None => false,
                    };
                summary
            })
            .collect();
        match &self.open {
            Some((id, _)) => !self.chats.iter().any(|c| c.chat_id == *id),
            None => false,
        }
    }

    /// Open the window on a registered chat, clearing its unread mark.
    /// Replaces any previous window.
    ///
    /// Returns the peer name, or `None` when the chat is not in the
    /// registry (a stale id after a sweep).
    pub fn open(&mut self, chat_id: &str) -> Option<String> {
        let chat = self.chats.iter_mut().find(|c| c.chat_id == chat_id)?;
        chat.has_unread = false;
        let other_name = chat.other_name.clone();
        self.open = Some((chat_id.to_string(), other_name.clone()));
        Some(other_name)
    }

    /// Close the window. The chat stays registered.
    pub fn close(&mut self) {
        self.open = None;
    }

    /// Drop a chat from the registry, closing the window if it showed it.
    ///
    /// Idempotent: removing an unknown chat is a no-op.
    pub fn remove(&mut self, chat_id: &str) {
        self.chats.retain(|c| c.chat_id != chat_id);
        if self.is_open(chat_id) {
            self.open = None;
        }
    }

    /// Drop everything: registry and window. Used by the reset sweep.
    pub fn clear(&mut self) {
        self.chats.clear();
        self.open = None;
    }
}

#[cfg(test)]
mod tests {
    use palaver_proto::{WirePrivateChat, WirePrivateLastMessage};

    use super::{PrivateChats, is_peer_gone};

    fn wire(chat_id: &str, other_name: &str) -> WirePrivateChat {
        wire_preview(chat_id, other_name, "hi")
    }

    fn wire_preview(chat_id: &str, other_name: &str, preview: &str) -> WirePrivateChat {
        WirePrivateChat {
            chat_id: chat_id.to_string(),
            other_name: other_name.to_string(),
            last_message: Some(WirePrivateLastMessage { content: preview.to_string() }),
        }
    }

    #[test]
    fn peer_gone_substrings() {
        assert!(is_peer_gone("对方已离线"));
        assert!(is_peer_gone("聊天已结束"));
        assert!(!is_peer_gone("对方正在输入"));
    }

    #[test]
    fn snapshot_reports_vanished_open_window() {
        let mut chats = PrivateChats::default();
        assert!(!chats.apply_snapshot(vec![wire("c1", "bob"), wire("c2", "carol")]));

        assert_eq!(chats.open("c1"), Some("bob".to_string()));
        assert!(!chats.apply_snapshot(vec![wire("c1", "bob")]));
        assert!(chats.apply_snapshot(vec![wire("c2", "carol")]));
    }

    #[test]
    fn opening_replaces_the_previous_window() {
        let mut chats = PrivateChats::default();
        chats.apply_snapshot(vec![wire("c1", "bob"), wire("c2", "carol")]);
        chats.open("c1");
        chats.open("c2");
        assert!(chats.is_open("c2"));
        assert!(!chats.is_open("c1"));
    }

    #[test]
    fn opening_an_unknown_chat_fails() {
        let mut chats = PrivateChats::default();
        assert_eq!(chats.open("ghost"), None);
        assert_eq!(chats.open_chat_id(), None);
    }

    #[test]
    fn preview_change_marks_unread_until_opened() {
        let mut chats = PrivateChats::default();
        chats.apply_snapshot(vec![wire("c1", "bob")]);
        assert!(!chats.summaries()[0].has_unread);

        // Unchanged preview: nothing new.
        chats.apply_snapshot(vec![wire("c1", "bob")]);
        assert!(!chats.summaries()[0].has_unread);

        chats.apply_snapshot(vec![wire_preview("c1", "bob", "yo")]);
        assert!(chats.summaries()[0].has_unread);

        // The flag survives further unchanged snapshots.
        chats.apply_snapshot(vec![wire_preview("c1", "bob", "yo")]);
        assert!(chats.summaries()[0].has_unread);

        chats.open("c1");
        assert!(!chats.summaries()[0].has_unread);
    }

    #[test]
    fn the_open_window_is_never_marked_unread() {
        let mut chats = PrivateChats::default();
        chats.apply_snapshot(vec![wire("c1", "bob"), wire("c2", "carol")]);
        chats.open("c1");
        chats.apply_snapshot(vec![
            wire_preview("c1", "bob", "yo"),
            wire_preview("c2", "carol", "yo"),
        ]);
        assert!(!chats.summaries()[0].has_unread);
        assert!(chats.summaries()[1].has_unread);
    }

    #[test]
    fn remove_is_idempotent_and_closes_the_window() {
        let mut chats = PrivateChats::default();
        chats.apply_snapshot(vec![wire("c1", "bob")]);
        chats.open("c1");
        chats.remove("c1");
        assert_eq!(chats.open_chat_id(), None);
        assert!(chats.summaries().is_empty());
        chats.remove("c1");
        assert!(chats.summaries().is_empty());
    }
}
