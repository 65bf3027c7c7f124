//! Session identity and the group message cursor.

/// Logged-in identity as granted by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Display name accepted by the server (may differ from the request).
    pub name: String,
    /// Opaque session key; also used for own-message detection.
    pub key: String,
}

/// Position in the group message stream.
///
/// `count` is the offset of consumed messages; `version` is the server's
/// history epoch. A version mismatch on the server side produces a
/// `reset: true` poll reply, which rebases this cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageCursor {
    /// Messages consumed so far.
    pub count: u64,
    /// History epoch the count is valid for.
    pub version: u64,
}

impl MessageCursor {
    /// Cursor at the start of the given epoch.
    pub fn at_epoch(version: u64) -> Self {
        Self { count: 0, version }
    }

    /// Rebase to a new epoch, discarding the consumed count.
    pub fn rebase(&mut self, version: Option<u64>) {
        self.count = 0;
        if let Some(version) = version {
            self.version = version;
        }
    }
}
