// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use av_engine::{EngineError, SignerError};
use av_keys::KeyError;
use av_transport::TransportError;
use thiserror::Error;

/// Every failure a vote operation can surface. Nothing is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoteError {
    /// A collaborator could not be reached or answered a non success status.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The key service answered without the fields needed to build a key.
    #[error("Key material unavailable: {0}")]
    KeyUnavailable(String),

    #[error("Encryption engine error: {0}")]
    EncryptionEngine(String),

    /// The wallet declined or failed to sign. Recoverable by asking again.
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Decryption rejected: {0}")]
    DecryptionRejected(String),
}

impl VoteError {
    /// Errors caused by the user rather than by a service.
    pub fn is_user_action(&self) -> bool {
        matches!(self, VoteError::AuthorizationDenied(_))
    }
}

impl From<KeyError> for VoteError {
    fn from(value: KeyError) -> Self {
        match value {
            KeyError::Transport(e) => VoteError::Transport(e),
            KeyError::Unavailable(reason) => VoteError::KeyUnavailable(reason),
        }
    }
}

impl From<EngineError> for VoteError {
    fn from(value: EngineError) -> Self {
        match value {
            EngineError::Transport(e) => VoteError::Transport(e),
            EngineError::Rejected(reason) => VoteError::DecryptionRejected(reason),
            e @ (EngineError::LaneOverflow(_)
            | EngineError::Initialization(_)
            | EngineError::Encryption(_)
            | EngineError::InvalidInput(_)) => VoteError::EncryptionEngine(e.to_string()),
        }
    }
}

impl From<SignerError> for VoteError {
    fn from(value: SignerError) -> Self {
        VoteError::AuthorizationDenied(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_mapping() {
        assert!(matches!(
            VoteError::from(EngineError::LaneOverflow(1 << 32)),
            VoteError::EncryptionEngine(_)
        ));
        assert!(matches!(
            VoteError::from(EngineError::Rejected("expired".into())),
            VoteError::DecryptionRejected(ref m) if m == "expired"
        ));
        assert!(matches!(
            VoteError::from(KeyError::unavailable("crs url missing")),
            VoteError::KeyUnavailable(_)
        ));
        let denied = VoteError::from(SignerError::Rejected("user rejected".into()));
        assert!(denied.is_user_action());
        assert!(!VoteError::from(TransportError::request("http://x", "refused")).is_user_action());
    }
}
