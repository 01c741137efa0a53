// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} answered HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response body from {url}: {message}")]
    Body { url: String, message: String },
}

impl TransportError {
    pub fn request(url: &str, message: impl ToString) -> Self {
        TransportError::Request {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn body(url: &str, message: impl ToString) -> Self {
        TransportError::Body {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The remote refused the request itself: malformed, unauthenticated or
    /// forbidden. Other 4xx answers (404, 408, 429) say nothing about the
    /// request and may succeed later.
    pub fn is_refusal(&self) -> bool {
        matches!(self.status(), Some(400 | 401 | 403))
    }

    pub fn url(&self) -> &str {
        match self {
            TransportError::Request { url, .. }
            | TransportError::Status { url, .. }
            | TransportError::Body { url, .. } => url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refusal_classification() {
        let status = |status: u16| TransportError::Status {
            url: "http://relayer/v1/user-decrypt".into(),
            status,
            body: "invalid signature".into(),
        };
        for refused in [400, 401, 403] {
            assert!(status(refused).is_refusal(), "{refused}");
        }
        for retryable in [404, 408, 429, 500, 503] {
            assert!(!status(retryable).is_refusal(), "{retryable}");
        }
        assert_eq!(status(400).status(), Some(400));
        assert!(!TransportError::request("http://x", "refused").is_refusal());
        assert_eq!(TransportError::body("http://x", "eof").url(), "http://x");
    }
}
