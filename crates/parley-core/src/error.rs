// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Parley chat engine.

use thiserror::Error;

use crate::types::ConversationId;

/// The primary error type used across the transport, engine, and send path.
#[derive(Debug, Error)]
pub enum ParleyError {
    /// Transport failures: network unreachable, non-2xx response, undecodable body.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        /// HTTP status code when the server answered at all.
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Missing or rejected credential. Reported by the transport on 401/403.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Malformed outgoing message, rejected before any transport call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Initial conversation metadata/history load failed.
    #[error("failed to load conversation {conversation_id}: {source}")]
    Load {
        conversation_id: ConversationId,
        source: Box<ParleyError>,
    },

    /// The conversation is not visible to the current user.
    #[error("conversation {0} not found or access denied")]
    ConversationNotFound(ConversationId),

    /// Configuration errors (invalid header values, client construction).
    #[error("configuration error: {0}")]
    Config(String),
}

impl ParleyError {
    /// Builds a [`ParleyError::Transport`] without a status or source.
    pub fn transport(message: impl Into<String>) -> Self {
        ParleyError::Transport {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// True for every failure that originated in the transport, including
    /// rejected credentials.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ParleyError::Transport { .. } | ParleyError::Authentication(_)
        )
    }

    /// HTTP status attached to a transport error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ParleyError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_counts_as_transport() {
        assert!(ParleyError::Authentication("expired".into()).is_transport());
        assert!(ParleyError::transport("unreachable").is_transport());
        assert!(!ParleyError::Validation("empty".into()).is_transport());
    }

    #[test]
    fn load_error_wraps_cause() {
        let err = ParleyError::Load {
            conversation_id: ConversationId(7),
            source: Box::new(ParleyError::ConversationNotFound(ConversationId(7))),
        };
        let text = err.to_string();
        assert!(text.contains("failed to load conversation 7"), "got: {text}");
        assert!(text.contains("not found"), "got: {text}");
    }

    #[test]
    fn status_is_only_reported_for_transport() {
        let err = ParleyError::Transport {
            message: "boom".into(),
            status: Some(502),
            source: None,
        };
        assert_eq!(err.status(), Some(502));
        assert_eq!(ParleyError::Validation("empty".into()).status(), None);
    }
}
