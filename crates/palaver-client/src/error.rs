//! Client error taxonomy.

use palaver_proto::ApiError;
use thiserror::Error;

/// Errors surfaced by the client state machine.
///
/// Most transport failures become user-visible actions rather than errors;
/// `handle` only fails for inputs the caller should have rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The server rejected the login credentials.
    #[error("authentication failed: {reason}")]
    Auth {
        /// What the server objected to.
        reason: String,
    },

    /// A request failed at the transport level.
    #[error("network failure during {operation}: {source}")]
    Network {
        /// Which operation was in flight.
        operation: &'static str,
        /// The transport's view of the failure.
        source: ApiError,
    },

    /// The client's cursor or session no longer matches the server.
    #[error("stale client state: {reason}")]
    StaleState {
        /// What went stale.
        reason: String,
    },

    /// The other party of a private chat left or ended the conversation.
    #[error("peer left the conversation")]
    PeerGone,

    /// User input that must not reach the wire.
    #[error("invalid input: {reason}")]
    Validation {
        /// Why the input was rejected.
        reason: String,
    },
}

impl ClientError {
    /// Whether retrying the same operation can succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { source, .. } => !source.is_gone() && !source.is_unauthorized(),
            Self::Auth { .. } | Self::StaleState { .. } | Self::PeerGone => false,
            Self::Validation { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use palaver_proto::ApiError;

    use super::ClientError;

    #[test]
    fn transiency_classification() {
        let timeout =
            ClientError::Network { operation: "poll", source: ApiError::Timeout };
        assert!(timeout.is_transient());

        let gone = ClientError::Network {
            operation: "private send",
            source: ApiError::Status(404),
        };
        assert!(!gone.is_transient());

        assert!(!ClientError::PeerGone.is_transient());
        assert!(!ClientError::Validation { reason: "empty".into() }.is_transient());
    }
}
