use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the session is in its request lifecycle.
///
/// `Idle` at rest, `AwaitingFirstToken` once a send starts, `Streaming` once
/// any chunk has been received, and back to `Idle` on completion or error.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    /// Ready for a new submission.
    #[default]
    Idle,

    /// A request is open but nothing has arrived yet.
    AwaitingFirstToken,

    /// Chunks are arriving.
    Streaming,
}

impl SessionStatus {
    /// Returns true if a new submission may start.
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionStatus::Idle)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "idle"),
            SessionStatus::AwaitingFirstToken => write!(f, "awaiting-first-token"),
            SessionStatus::Streaming => write!(f, "streaming"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        assert!(SessionStatus::default().is_idle());
        assert!(!SessionStatus::Streaming.is_idle());
        assert!(!SessionStatus::AwaitingFirstToken.is_idle());
    }

    #[test]
    fn display_matches_serialization() {
        for status in [
            SessionStatus::Idle,
            SessionStatus::AwaitingFirstToken,
            SessionStatus::Streaming,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }
}
